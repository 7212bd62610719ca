//! Log output for C hosts.

use std::sync::Once;

use log::LevelFilter;

use crate::status::VisuStatus;

static INIT_LOGGER: Once = Once::new();

/// Route the reader's log records to stderr.
///
/// `level`: 0 off, 1 error, 2 warn, 3 info, 4 debug, 5 trace. `RUST_LOG`
/// refines the filter. Only the first call has an effect.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn visu_log_init(level: i32) -> i32 {
    ffi_guard!({
        let filter = match level {
            0 => LevelFilter::Off,
            1 => LevelFilter::Error,
            2 => LevelFilter::Warn,
            3 => LevelFilter::Info,
            4 => LevelFilter::Debug,
            5 => LevelFilter::Trace,
            _ => return VisuStatus::InvalidArgument as i32,
        };
        INIT_LOGGER.call_once(|| {
            let mut builder = env_logger::Builder::new();
            builder.filter_level(filter);
            builder.parse_default_env();
            builder.format(|buf, record| {
                use std::io::Write;
                writeln!(buf, "[visu {}] {}", record.level(), record.args())
            });
            builder.try_init().ok();
        });
        VisuStatus::Ok as i32
    })
}
