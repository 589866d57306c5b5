use crate::events::AppEvent;
use async_channel::Sender;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::UnixListener;

const SOCKET_PATH: &str = "/tmp/tombola.sock";

/// Line protocol: `spin`, `spin <index>`, `reload`.
pub fn parse_command(line: &str) -> Option<AppEvent> {
    let mut parts = line.split_whitespace();
    match parts.next()? {
        "spin" => match parts.next() {
            None => Some(AppEvent::Spin { winner: None }),
            Some(raw) => match raw.parse() {
                Ok(index) => Some(AppEvent::Spin {
                    winner: Some(index),
                }),
                Err(_) => {
                    log::warn!("Ignoring spin with bad winner index {:?}", raw);
                    None
                }
            },
        },
        "reload" => Some(AppEvent::Reload),
        other => {
            log::warn!("Unknown command {:?}", other);
            None
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
                        if let Some(event) = parse_command(line.trim())
                            && tx.send(event).await.is_err()
                        {
                            break;
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
    fn test_parse_command() {
        assert_eq!(
            parse_command("spin"),
            Some(AppEvent::Spin { winner: None })
        );
        assert_eq!(
            parse_command("spin 3"),
            Some(AppEvent::Spin { winner: Some(3) })
        );
        assert_eq!(parse_command("reload"), Some(AppEvent::Reload));
        assert_eq!(parse_command("spin seven"), None);
        assert_eq!(parse_command("bogus"), None);
        assert_eq!(parse_command(""), None);
    }
}
