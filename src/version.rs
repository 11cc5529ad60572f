const fn unwrap_or_cargo_version(opt: Option<&'static str>) -> &'static str {
    match opt {
        Some(val) => val,
        None => env!("CARGO_PKG_VERSION"),
    }
}

/// Version reported by `--version`, `GET /` and the simulated alert e-mail.
/// `PULSECHECK_VERSION` set at build time overrides the crate version.
pub const VERSION: &str = unwrap_or_cargo_version(option_env!("PULSECHECK_VERSION"));
