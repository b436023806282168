use std::{
    error::Error,
    io,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use clap::Parser;
use icicle::{Client, Command, Endpoint, prompt};

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Server hostname
    #[arg(long, env = "ICICLE_HOST", default_value = "localhost")]
    host: String,
    /// Server port
    #[arg(long, env = "ICICLE_PORT", default_value_t = 9001)]
    port: u16,
    /// Single command to execute; omit for an interactive session
    command: Option<String>,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let cli = Cli::parse();
    let mut client = Client::connect(Endpoint::new(cli.host, cli.port))?;

    if let Some(command) = cli.command {
        println!("{}", client.cmd(&command)?);
        return Ok(());
    }

    let interrupted = Arc::new(AtomicBool::new(false));
    {
        let interrupted = Arc::clone(&interrupted);
        ctrlc::set_handler(move || interrupted.store(true, Ordering::SeqCst))?;
    }

    let stdio = io::stdin();
    let stdout = io::stdout();

    while !interrupted.load(Ordering::SeqCst) {
        let reader = stdio.lock();
        let writer = StdOut {
            inner: stdout.lock(),
        };

        let cmd = match prompt(reader, writer) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("{}", e);
                continue;
            }
        };

        match cmd {
            Command::Exit => break,
            Command::Raw(line) if line.is_empty() => {}
            Command::Raw(line) => match client.cmd(&line) {
                Ok(out) => println!("{out}"),
                Err(e) if e.is_server_error() => eprintln!("{e}"),
                Err(e) => return Err(Box::new(e)),
            },
        }
    }

    Ok(())
}

/// StdOut wrapper that automatically flushes content after every write.
struct StdOut<W: io::Write> {
    inner: W,
}

impl<W: io::Write> io::Write for StdOut<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let res = self.inner.write(buf);
        if res.is_ok() {
            self.inner.flush()?
        }
        res
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}
