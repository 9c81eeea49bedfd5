use installments::{Config, Ledger, Shell};
use log::error;

fn main() {
    env_logger::init();
    let config = Config::default();
    let ledger = Ledger::open(config.clone()).unwrap_or_else(|err| {
        panic!(
            "Couldn't prepare data files in {}: {err}",
            config.data_dir().display()
        )
    });
    let stdin = std::io::stdin().lock();
    let stdout = std::io::stdout().lock();
    if let Err(err) = Shell::new(ledger, stdin, stdout).run() {
        error!("Terminal I/O failed: {err}");
        std::process::exit(1);
    }
}
