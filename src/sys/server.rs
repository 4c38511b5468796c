use crate::events::AppEvent;
use async_channel::Sender;
use strum::{Display as StrumDisplay, EnumString};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::UnixListener;

pub const SOCKET_PATH: &str = "/tmp/fortuna.sock";

/// One command per line on the control socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, StrumDisplay)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
pub enum IpcCommand {
    Spin,
    Reload,
}

impl From<IpcCommand> for AppEvent {
    fn from(cmd: IpcCommand) -> Self {
        match cmd {
            IpcCommand::Spin => AppEvent::Spin,
            IpcCommand::Reload => AppEvent::ConfigReload,
        }
    }
}

pub async fn run_server(tx: Sender<AppEvent>) {
    // Cleanup old socket if it exists
    if std::fs::metadata(SOCKET_PATH).is_ok() {
        let _ = std::fs::remove_file(SOCKET_PATH);
    }

    let listener = match UnixListener::bind(SOCKET_PATH) {
        Ok(l) => l,
        Err(e) => {
            log::error!("Failed to bind unix socket: {}", e);
            return;
        }
    };

    loop {
        match listener.accept().await {
            Ok((mut stream, _)) => {
                let tx = tx.clone();
                tokio::spawn(async move {
                    let reader = BufReader::new(&mut stream);
                    let mut lines = reader.lines();

                    while let Ok(Some(line)) = lines.next_line().await {
                        match line.trim().parse::<IpcCommand>() {
                            Ok(cmd) => {
                                log::debug!("Received '{}' on control socket", cmd);
                                let _ = tx.send(cmd.into()).await;
                            }
                            Err(_) => log::warn!("Ignoring unknown command '{}'", line.trim()),
                        }
                    }
                });
            }
            Err(e) => {
                log::error!("Failed to accept connection: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_parsing() {
        let cases = vec![
            ("spin", IpcCommand::Spin),
            ("SPIN", IpcCommand::Spin),
            ("reload", IpcCommand::Reload),
            ("Reload", IpcCommand::Reload),
        ];

        for (line, expected) in cases {
            assert_eq!(line.parse::<IpcCommand>().unwrap(), expected);
        }
        assert!("show".parse::<IpcCommand>().is_err());
        assert_eq!(IpcCommand::Spin.to_string(), "spin");
    }

    #[test]
    fn test_command_to_event() {
        assert!(matches!(AppEvent::from(IpcCommand::Spin), AppEvent::Spin));
        assert!(matches!(
            AppEvent::from(IpcCommand::Reload),
            AppEvent::ConfigReload
        ));
    }
}
