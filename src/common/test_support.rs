use once_cell::sync::OnceCell;

static INIT: OnceCell<()> = OnceCell::new();

/// Idempotently installs `env_logger` as the global logger. Opt-in: call
/// from tests that want to observe `log::` output; never required for a
/// test to pass.
pub fn init_test_logging() {
    INIT.get_or_init(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}
