//! Helpers shared by the unit tests of this crate.

use {
    crate::environment::{MockDeployments, MockNamedAccounts, Network, RuntimeEnvironment},
    std::{
        io,
        sync::{Arc, Mutex},
    },
    tracing::subscriber::DefaultGuard,
    tracing_subscriber::fmt::MakeWriter,
};

pub fn localhost() -> Network {
    Network {
        name: "localhost".to_string(),
        chain_id: 31337,
    }
}

pub fn environment(
    accounts: MockNamedAccounts,
    deployments: MockDeployments,
) -> RuntimeEnvironment {
    RuntimeEnvironment {
        network: localhost(),
        accounts: Arc::new(accounts),
        deployments: Arc::new(deployments),
    }
}

/// Log output captured for the current thread. Dropping it restores the
/// previous subscriber.
pub struct CapturedLogs {
    buffer: Buffer,
    _guard: DefaultGuard,
}

impl CapturedLogs {
    pub fn lines_containing(&self, needle: &str) -> Vec<String> {
        let bytes = self.buffer.0.lock().unwrap();
        String::from_utf8_lossy(&bytes)
            .lines()
            .filter(|line| line.contains(needle))
            .map(str::to_owned)
            .collect()
    }
}

/// Captures everything logged on the current thread. `#[tokio::test]` uses a
/// current thread runtime, so this also covers the futures the test awaits.
pub fn capture_logs() -> CapturedLogs {
    let buffer = Buffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(buffer.clone())
        .with_ansi(false)
        .without_time()
        .finish();
    CapturedLogs {
        buffer,
        _guard: tracing::subscriber::set_default(subscriber),
    }
}

#[derive(Clone, Default)]
struct Buffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for Buffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for Buffer {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
