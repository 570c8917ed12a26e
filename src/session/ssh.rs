use super::*;

/// Runs the neighbor command on an SSH exec channel.
#[derive(Debug, Clone)]
pub struct SshReader {
    host: String,
    credentials: Credentials,
    config: ReaderConfig,
}

impl SshReader {
    pub fn new(host: impl Into<String>, credentials: Credentials, config: ReaderConfig) -> Self {
        Self {
            host: host.into(),
            credentials,
            config,
        }
    }

    fn device_addr(&self) -> String {
        format!(
            "{}@{}:{}",
            self.credentials.username, self.host, self.config.ssh_port
        )
    }

    async fn connect(&self) -> Result<Client, ConnectError> {
        let device_addr = self.device_addr();
        let security_options = ConnectionSecurityOptions::from_config(&self.config);

        let ssh_config = async_ssh2_tokio::Config {
            preferred: security_options.preferred(),
            inactivity_timeout: Some(self.config.read_timeout()),
            ..Default::default()
        };

        let connect = Client::connect_with_config(
            (self.host.clone(), self.config.ssh_port),
            &self.credentials.username,
            AuthMethod::with_password(&self.credentials.password),
            security_options.server_check.clone(),
            ssh_config,
        );

        match tokio::time::timeout(self.config.connect_timeout(), connect).await {
            Ok(Ok(client)) => {
                debug!("{} TCP connection successful", device_addr);
                Ok(client)
            }
            Ok(Err(err)) => {
                let err = ConnectError::from(err);
                if err.is_auth_failure() {
                    let reason = format!("{device_addr}: {err}");
                    return Err(ConnectError::AuthenticationFailed(reason));
                }
                Err(err)
            }
            Err(_) => Err(ConnectError::Timeout(format!("ssh connect to {device_addr}"))),
        }
    }
}

impl SessionReader for SshReader {
    fn transport(&self) -> &'static str {
        "ssh"
    }

    async fn read_neighbors(&self) -> Result<String, ConnectError> {
        let device_addr = self.device_addr();
        let client = self.connect().await?;

        let command = self.config.command.as_str();
        let result = tokio::time::timeout(self.config.read_timeout(), client.execute(command))
            .await
            .map_err(|_| ConnectError::Timeout(format!("{device_addr} running '{command}'")))??;
        trace!("{} stdout: {:?}", device_addr, result.stdout);

        if let Err(e) = client.disconnect().await {
            debug!("{} Error during disconnect: {}", device_addr, e);
        }

        if result.exit_status != 0 {
            return Err(ConnectError::CommandFailed {
                command: command.to_string(),
                exit_status: result.exit_status,
            });
        }

        debug!(
            "{} '{}' returned {} bytes",
            device_addr,
            command,
            result.stdout.len()
        );
        Ok(result.stdout)
    }
}
