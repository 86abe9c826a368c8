use anyhow::Result;

use wc_calendar::config::{self, HostMetricsConfig};
use wc_calendar::export::{render_json, write_host_workbook, write_json};
use wc_calendar::host_series::produce_host_series;

fn main() -> Result<()> {
    config::load_env_files();
    config::init_logging();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let cfg = HostMetricsConfig::from_env(&args)?;

    let hosts = produce_host_series(&cfg.editions_dir)?;

    match cfg.json_out.as_deref() {
        Some(path) => {
            write_json(path, &hosts)?;
            log::info!("wrote {} hosts to {}", hosts.len(), path.display());
        }
        None => println!("{}", render_json(&hosts)?),
    }

    if let Some(path) = cfg.xlsx_out.as_deref() {
        let rows = write_host_workbook(path, &hosts)?;
        log::info!("wrote {rows} metric rows to {}", path.display());
    }

    Ok(())
}
