//! Serve command - run the interactive dashboard

use super::load_store;
use crate::shell::{server, Dashboard};
use clap::Args;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub struct ServeCommand {
    /// Directory containing kaq1.csv .. kaq5.csv, aq1.csv and aq2.csv
    #[arg(short, long, default_value = "results")]
    results_dir: PathBuf,

    /// Address to listen on
    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    host: IpAddr,

    /// Port to listen on
    #[arg(short, long, default_value_t = 8050)]
    port: u16,

    /// Open the dashboard in a browser once listening
    #[arg(long)]
    open: bool,
}

impl Default for ServeCommand {
    fn default() -> Self {
        ServeCommand {
            results_dir: PathBuf::from("results"),
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 8050,
            open: false,
        }
    }
}

impl ServeCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        // data must be complete before the listener binds
        let store = load_store(&self.results_dir)?;
        let dashboard = Arc::new(Dashboard::new(store));
        let addr = SocketAddr::new(self.host, self.port);

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        runtime.block_on(server::serve(dashboard, addr, self.open))
    }
}
