use crate::config::EngineConfig;
use crate::watchdog::Watchdog;
use log::{error, trace, warn};
use std::fmt;
use std::fs;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command, Stdio};
use std::sync::{Arc, Mutex};
use std::thread;

#[derive(Debug)]
pub enum GtpError {
    EmptyResponse,
    BadReply(String),
    Crashed(String),
    Io(io::Error),
}

impl fmt::Display for GtpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GtpError::EmptyResponse => write!(f, "got empty response"),
            GtpError::BadReply(body) => write!(f, "got reply: {body}"),
            GtpError::Crashed(name) => write!(f, "{name} crashed"),
            GtpError::Io(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for GtpError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GtpError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for GtpError {
    fn from(err: io::Error) -> GtpError {
        GtpError::Io(err)
    }
}

#[derive(Debug)]
pub struct Engine {
    name: String,
    dir: PathBuf,
    base: String,
    exe: PathBuf,
    args: Vec<String>,
    commands: Vec<String>,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    child: Arc<Mutex<Child>>,
}

impl Engine {
    pub fn start(config: &EngineConfig, watchdog: &Watchdog) -> io::Result<Engine> {
        let exe = fs::canonicalize(&config.path)?;
        let dir = exe
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("/"));
        let base = exe
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| config.path.clone());

        let (child, stdin, stdout) = spawn(&config.name, &exe, &dir, &config.args)?;
        let child = Arc::new(Mutex::new(child));
        watchdog.register(config.name.clone(), Arc::clone(&child));

        Ok(Engine {
            name: config.name.clone(),
            dir,
            base,
            exe,
            args: config.args.clone(),
            commands: config.commands.clone(),
            stdin,
            stdout,
            child,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    pub fn restart(&mut self) -> io::Result<()> {
        let _ = self.kill();
        let (child, stdin, stdout) = spawn(&self.name, &self.exe, &self.dir, &self.args)?;
        self.stdin = stdin;
        self.stdout = stdout;
        *self.child.lock().unwrap() = child;
        Ok(())
    }

    pub fn kill(&mut self) -> io::Result<()> {
        let mut child = self.child.lock().unwrap();
        let result = child.kill();
        let _ = child.wait();
        result
    }

    pub fn send_and_receive(&mut self, message: &str) -> Result<String, GtpError> {
        let message = message.trim();
        trace!("{} < {message}", self.name);
        writeln!(self.stdin, "{message}")?;
        self.stdin.flush()?;
        let response = read_response(&mut self.stdout, &self.name)?;
        trace!("{} > {response}", self.name);
        Ok(response)
    }
}

fn spawn(
    name: &str,
    exe: &Path,
    dir: &Path,
    args: &[String],
) -> io::Result<(Child, ChildStdin, BufReader<ChildStdout>)> {
    let mut child = Command::new(exe)
        .args(args)
        .current_dir(dir)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    let stdin = child.stdin.take().unwrap();
    let stdout = BufReader::new(child.stdout.take().unwrap());
    let stderr = BufReader::new(child.stderr.take().unwrap());

    // Ends by itself when the pipe closes on exit or restart.
    let drain_name = name.to_string();
    thread::spawn(move || drain_stderr(drain_name, stderr));

    Ok((child, stdin, stdout))
}

fn drain_stderr(name: String, stderr: BufReader<ChildStderr>) {
    for line in stderr.lines() {
        match line {
            Ok(line) => trace!("{name} ! {line}"),
            Err(err) => {
                warn!("{name} stderr: {err}");
                break;
            }
        }
    }
}

fn read_response<R: BufRead>(reader: &mut R, name: &str) -> Result<String, GtpError> {
    let mut body = String::new();
    loop {
        let mut line = String::new();
        let count = reader.read_line(&mut line)?;
        if count == 0 {
            error!("{name} disconnected");
            return Err(GtpError::Crashed(name.to_string()));
        }
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            let body = body.trim();
            if body.is_empty() {
                return Err(GtpError::EmptyResponse);
            }
            if !body.starts_with('=') {
                return Err(GtpError::BadReply(body.to_string()));
            }
            let stripped = body.trim_start_matches(|c: char| c == '=' || c.is_ascii_digit());
            return Ok(stripped.trim().to_string());
        }
        if !body.is_empty() {
            body.push('\n');
        }
        body.push_str(line);
    }
}
