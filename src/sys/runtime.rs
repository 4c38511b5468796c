use crate::events::AppEvent;
use async_channel::Sender;
use std::thread;
use tokio::runtime::{Handle, Runtime};

/// Runs the socket server and config watcher on a tokio runtime in its own thread. The returned
/// handle is used to spawn image loads onto the same runtime.
pub fn start_background_services(tx: Sender<AppEvent>) -> std::io::Result<Handle> {
    let rt = Runtime::new()?;
    let handle = rt.handle().clone();

    thread::Builder::new()
        .name("fortuna-services".into())
        .spawn(move || {
            rt.block_on(async {
                {
                    let tx = tx.clone();
                    tokio::spawn(async move {
                        crate::sys::server::run_server(tx).await;
                    });
                }

                {
                    let tx = tx.clone();
                    tokio::spawn(async move {
                        crate::config::run_async_watcher(tx).await;
                    });
                }

                std::future::pending::<()>().await;
            });
        })?;

    Ok(handle)
}
