use std::process::ExitCode;

use dcommon::Database;
use dkernel::{check_module, syntax::Module, Tcm};
use summary::DatatypeSummary;
use tracing::{error, info};
use tracing_subscriber::{fmt::format::FmtSpan, FmtSubscriber};

mod summary;

fn main() -> ExitCode {
    let log_level = std::env::var("DCHECK_LOG")
        .ok()
        .and_then(|level| level.parse().ok())
        .unwrap_or(tracing::Level::INFO);
    let subscriber = FmtSubscriber::builder()
        .with_writer(std::io::stderr)
        .with_max_level(log_level)
        .with_span_events(FmtSpan::CLOSE)
        .with_timer(tracing_subscriber::fmt::time::uptime())
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("could not set default tracing subscriber");
    info!("initialised logging with verbosity level {}", log_level);

    let path = match std::env::args().nth(1) {
        Some(path) => path,
        None => {
            eprintln!("usage: dcheck <module.ron>");
            return ExitCode::FAILURE;
        }
    };
    let text = match std::fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) => {
            error!("could not read {}: {}", path, err);
            return ExitCode::FAILURE;
        }
    };
    let module = match Module::from_ron(&text) {
        Ok(module) => module,
        Err(err) => {
            error!("could not parse {}: {}", path, err);
            return ExitCode::FAILURE;
        }
    };

    let db = Database::default();
    let mut tcm = Tcm::new(&db, module.options.clone());
    let result = check_module(&mut tcm, &module);

    // Use a locked version of `stderr`, so that reports are not interspersed
    // with other things such as tracing messages.
    let mut stderr = std::io::stderr().lock();
    for report in result.reports() {
        if let Err(err) = report.render(&mut stderr) {
            error!("could not write report: {}", err);
        }
    }
    drop(stderr);

    if let Some(certified) = result.value() {
        let summaries = certified
            .iter()
            .map(|datatype| DatatypeSummary::new(&db, datatype))
            .collect::<Vec<_>>();
        match ron::ser::to_string_pretty(&summaries, ron::ser::PrettyConfig::default()) {
            Ok(text) => println!("{}", text),
            Err(err) => error!("could not serialise summary: {}", err),
        }
    }

    if result.errored() {
        ExitCode::FAILURE
    } else {
        info!("success");
        ExitCode::SUCCESS
    }
}
