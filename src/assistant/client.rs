//! AI completion client
//!
//! The completion backend is any external command that reads a prompt on
//! stdin and prints the model's reply on stdout. The credential is handed to
//! the child process through `OMNIFIX_API_KEY`; it never appears in argv.
//!
//! The prompt is written and the reply read on helper threads while the
//! calling thread waits on the child, so neither pipe can fill up and stall
//! the exchange. A child still running at the deadline is killed.

use std::io::{self, ErrorKind, Read, Write};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::core::Config;

/// How often a running child is polled for exit
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Environment variable carrying the credential to the completion command
pub const API_KEY_ENV: &str = "OMNIFIX_API_KEY";

/// Why the upstream backend could not produce a usable answer
///
/// Callers treat every variant the same way: log it and fall back to local
/// data.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("AI backend not configured (ai_command is unset)")]
    NotConfigured,

    #[error("AI backend credentials missing (set api_key or OMNIFIX_API_KEY)")]
    MissingCredentials,

    #[error("Failed to start '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("AI command timed out after {}s", .after.as_secs_f32())]
    Timeout { after: Duration },

    #[error("AI command failed (exit code {code:?}): {stderr}")]
    CommandFailed { code: Option<i32>, stderr: String },

    #[error("Malformed AI response: {0}")]
    MalformedResponse(String),

    #[error("AI response does not match the {schema} schema: {}", .violations.join("; "))]
    SchemaViolation {
        schema: &'static str,
        violations: Vec<String>,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// A text-completion backend
pub trait CompletionClient {
    /// Send one prompt and return the raw reply text
    fn complete(&self, prompt: &str) -> Result<String, UpstreamError>;
}

impl<C: CompletionClient + ?Sized> CompletionClient for Box<C> {
    fn complete(&self, prompt: &str) -> Result<String, UpstreamError> {
        (**self).complete(prompt)
    }
}

/// Client used when no backend is configured or `--offline` is given
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineClient;

impl CompletionClient for OfflineClient {
    fn complete(&self, _prompt: &str) -> Result<String, UpstreamError> {
        Err(UpstreamError::NotConfigured)
    }
}

/// Client that shells out to an external completion command
#[derive(Debug, Clone)]
pub struct CommandClient {
    command: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl CommandClient {
    /// Create a client for `command` (program plus arguments, whitespace separated)
    pub fn new(command: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            command: command.into(),
            api_key,
            timeout: Config::default().ai_timeout(),
        }
    }

    /// Build a client from configuration, if a command is configured
    pub fn from_config(config: &Config) -> Option<Self> {
        config.ai_command.as_ref().map(|cmd| {
            Self::new(cmd.clone(), config.api_key.clone()).with_timeout(config.ai_timeout())
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl CompletionClient for CommandClient {
    fn complete(&self, prompt: &str) -> Result<String, UpstreamError> {
        let key = match self.api_key.as_deref() {
            Some(k) if !k.is_empty() && k != "undefined" => k,
            _ => return Err(UpstreamError::MissingCredentials),
        };

        let parts: Vec<&str> = self.command.split_whitespace().collect();
        let Some((program, args)) = parts.split_first() else {
            return Err(UpstreamError::NotConfigured);
        };

        let mut child = Command::new(program)
            .args(args)
            .env(API_KEY_ENV, key)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| UpstreamError::Spawn {
                command: program.to_string(),
                source,
            })?;

        let writer = child.stdin.take().map(|stdin| spawn_writer(stdin, prompt));
        let stdout = child.stdout.take().map(spawn_reader);
        let stderr = child.stderr.take().map(spawn_reader);

        let Some(status) = wait_until(&mut child, self.timeout)? else {
            // Helper threads end once the killed child's pipes close
            let _ = child.kill();
            let _ = child.wait();
            return Err(UpstreamError::Timeout {
                after: self.timeout,
            });
        };

        if let Some(writer) = writer {
            join(writer)?;
        }
        let stdout = stdout.map(join).transpose()?.unwrap_or_default();
        let stderr = stderr.map(join).transpose()?.unwrap_or_default();

        if !status.success() {
            return Err(UpstreamError::CommandFailed {
                code: status.code(),
                stderr: String::from_utf8_lossy(&stderr).trim().to_string(),
            });
        }

        let text = String::from_utf8(stdout)
            .map_err(|e| UpstreamError::MalformedResponse(e.to_string()))?;
        let text = text.trim();
        if text.is_empty() {
            return Err(UpstreamError::MalformedResponse("empty response".to_string()));
        }

        Ok(text.to_string())
    }
}

/// Feed the prompt to the child and close its stdin
fn spawn_writer<W: Write + Send + 'static>(mut stdin: W, prompt: &str) -> JoinHandle<io::Result<()>> {
    let bytes = prompt.as_bytes().to_vec();
    thread::spawn(move || match stdin.write_all(&bytes) {
        // A backend that exits without reading its input is judged by its exit status
        Err(e) if e.kind() == ErrorKind::BrokenPipe => Ok(()),
        other => other,
    })
}

fn spawn_reader<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<io::Result<Vec<u8>>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        pipe.read_to_end(&mut buf)?;
        Ok(buf)
    })
}

fn join<T>(handle: JoinHandle<io::Result<T>>) -> io::Result<T> {
    handle
        .join()
        .unwrap_or_else(|_| Err(io::Error::new(ErrorKind::Other, "pipe thread panicked")))
}

/// Wait for the child to exit; `None` when the deadline passes first
fn wait_until(child: &mut Child, timeout: Duration) -> io::Result<Option<ExitStatus>> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offline_client_is_not_configured() {
        let err = OfflineClient.complete("anything").unwrap_err();
        assert!(matches!(err, UpstreamError::NotConfigured));
    }

    #[test]
    fn test_missing_key_fails_before_spawn() {
        let client = CommandClient::new("definitely-not-a-real-binary-omnifix", None);
        let err = client.complete("hola").unwrap_err();
        assert!(matches!(err, UpstreamError::MissingCredentials));

        let client = CommandClient::new("cat", Some("undefined".to_string()));
        assert!(matches!(
            client.complete("hola").unwrap_err(),
            UpstreamError::MissingCredentials
        ));
    }

    #[test]
    fn test_blank_command_is_not_configured() {
        let client = CommandClient::new("   ", Some("key".to_string()));
        assert!(matches!(
            client.complete("hola").unwrap_err(),
            UpstreamError::NotConfigured
        ));
    }

    #[test]
    fn test_unknown_program_is_spawn_error() {
        let client = CommandClient::new("definitely-not-a-real-binary-omnifix", Some("k".to_string()));
        let err = client.complete("hola").unwrap_err();
        assert!(matches!(err, UpstreamError::Spawn { .. }));
    }

    #[test]
    fn test_from_config() {
        assert!(CommandClient::from_config(&Config::default()).is_none());

        let config = Config {
            ai_command: Some("llm -m local".to_string()),
            api_key: Some("secret".to_string()),
            ..Default::default()
        };
        let client = CommandClient::from_config(&config).unwrap();
        assert_eq!(client.command(), "llm -m local");
        assert_eq!(client.timeout(), config.ai_timeout());

        let config = Config {
            ai_timeout_secs: Some(7),
            ..config
        };
        let client = CommandClient::from_config(&config).unwrap();
        assert_eq!(client.timeout(), Duration::from_secs(7));
    }

    #[cfg(unix)]
    #[test]
    fn test_command_echoes_prompt() {
        let client = CommandClient::new("cat", Some("k".to_string()));
        assert_eq!(client.complete("  {\"ok\":true}\n").unwrap(), "{\"ok\":true}");
    }

    #[cfg(unix)]
    #[test]
    fn test_command_failure_carries_exit_code() {
        let client = CommandClient::new("false", Some("k".to_string()));
        let err = client.complete("x").unwrap_err();
        assert!(matches!(err, UpstreamError::CommandFailed { code: Some(1), .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_empty_output_is_malformed() {
        let client = CommandClient::new("true", Some("k".to_string()));
        let err = client.complete("x").unwrap_err();
        assert!(matches!(err, UpstreamError::MalformedResponse(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_hanging_command_times_out() {
        let client = CommandClient::new("sleep 30", Some("k".to_string()))
            .with_timeout(Duration::from_millis(200));
        let started = Instant::now();
        let err = client.complete("x").unwrap_err();
        assert!(matches!(err, UpstreamError::Timeout { .. }));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[cfg(unix)]
    #[test]
    fn test_large_prompt_round_trips() {
        let client = CommandClient::new("cat", Some("k".to_string()));
        let prompt = "x".repeat(1024 * 1024);
        let reply = client.complete(&prompt).unwrap();
        assert_eq!(reply.len(), prompt.len());
    }
}
