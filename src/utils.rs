use core::panic::PanicInfo;

#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    error!("panic");
    if let Some(loc) = info.location() {
        error!("at {}:{}:{}", loc.file(), loc.line(), loc.column());
    }
    match info.message().as_str() {
        Some(msg) => error!("{}", msg),
        None => error!("no static panic message"),
    }
    loop {}
}
