//! Shared test helpers: in-memory fakes for every port.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Output};
use std::rc::Rc;
use std::time::Duration;

use anyhow::{Result, bail};
use ovnode_cli::application::NodeHost;
use ovnode_cli::application::ports::{
    ArchiveExtractor, CommandRunner, DriveOutcome, HostAddress, HostFs, InteractiveDriver,
    ProgressReporter, Prompter, ReleaseDescriptor, RemoteSource, ServiceSupervisor,
};
use ovnode_cli::domain::{ExpectScript, ProvisionError, ServiceStatus, ServiceUnit};

// ── Cross-platform ExitStatus construction ───────────────────────────────────

/// Build an `ExitStatus` from a logical exit code (0 = success, non-zero = failure).
///
/// The raw wait-status encodes the exit code in bits 8–15, so we shift.
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    ExitStatus::from_raw(code << 8)
}

pub fn output(code: i32, stderr: &str) -> Output {
    Output {
        status: exit_status(code),
        stdout: Vec::new(),
        stderr: stderr.as_bytes().to_vec(),
    }
}

// ── Filesystem ───────────────────────────────────────────────────────────────

#[derive(Default)]
struct FsState {
    files: BTreeMap<PathBuf, String>,
    dirs: BTreeSet<PathBuf>,
    modes: BTreeMap<PathBuf, u32>,
    /// Mutating operations in call order, e.g. `"write /opt/ov-node/.env"`.
    log: Vec<String>,
}

/// In-memory filesystem. Clones share state, so adapters that create files
/// (driver, remote, archive) can write into the same tree.
#[derive(Clone, Default)]
pub struct FakeFs {
    state: Rc<RefCell<FsState>>,
}

impl FakeFs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.put(Path::new(path), content);
        self
    }

    pub fn with_dir(self, path: &str) -> Self {
        self.state.borrow_mut().dirs.insert(PathBuf::from(path));
        self
    }

    /// Place a file without logging it as a side effect.
    pub fn put(&self, path: &Path, content: &str) {
        self.state
            .borrow_mut()
            .files
            .insert(path.to_path_buf(), content.to_string());
    }

    pub fn file(&self, path: &str) -> Option<String> {
        self.state.borrow().files.get(Path::new(path)).cloned()
    }

    pub fn mode(&self, path: &str) -> Option<u32> {
        self.state.borrow().modes.get(Path::new(path)).copied()
    }

    pub fn log(&self) -> Vec<String> {
        self.state.borrow().log.clone()
    }

    fn record(&self, entry: String) {
        self.state.borrow_mut().log.push(entry);
    }
}

fn missing(path: &Path) -> anyhow::Error {
    ProvisionError::FileAccess {
        path: path.to_path_buf(),
        reason: "No such file or directory".to_string(),
    }
    .into()
}

impl HostFs for FakeFs {
    fn exists(&self, path: &Path) -> bool {
        let state = self.state.borrow();
        state.files.contains_key(path)
            || state.dirs.contains(path)
            || state.files.keys().any(|p| p.starts_with(path))
            || state.dirs.iter().any(|p| p.starts_with(path))
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.state
            .borrow()
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| missing(path))
    }

    fn write(&self, path: &Path, content: &str) -> Result<()> {
        self.record(format!("write {}", path.display()));
        self.put(path, content);
        Ok(())
    }

    fn create_dir_all(&self, path: &Path, mode: Option<u32>) -> Result<()> {
        self.record(format!("mkdir {}", path.display()));
        let mut state = self.state.borrow_mut();
        state.dirs.insert(path.to_path_buf());
        if let Some(mode) = mode {
            state.modes.insert(path.to_path_buf(), mode);
        }
        Ok(())
    }

    fn remove_dir_all(&self, path: &Path) -> Result<()> {
        if !self.exists(path) {
            return Err(missing(path));
        }
        self.record(format!("rmdir {}", path.display()));
        let mut state = self.state.borrow_mut();
        state.files.retain(|p, _| !p.starts_with(path));
        state.dirs.retain(|p| !p.starts_with(path));
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        self.record(format!("rm {}", path.display()));
        match self.state.borrow_mut().files.remove(path) {
            Some(_) => Ok(()),
            None => Err(missing(path)),
        }
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<()> {
        let content = self.read_to_string(from)?;
        self.record(format!("copy {} {}", from.display(), to.display()));
        self.put(to, &content);
        Ok(())
    }
}

// ── Service supervisor ───────────────────────────────────────────────────────

/// Records every call as `"{action} {unit}"`; actions in `failing` error.
#[derive(Default)]
pub struct RecordingSupervisor {
    pub calls: RefCell<Vec<String>>,
    pub installed: RefCell<Vec<ServiceUnit>>,
    pub failing: BTreeSet<&'static str>,
    pub status: Option<ServiceStatus>,
}

impl RecordingSupervisor {
    pub fn failing_on(actions: &[&'static str]) -> Self {
        Self {
            failing: actions.iter().copied().collect(),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn call(&self, action: &'static str, unit: &str) -> Result<()> {
        self.calls.borrow_mut().push(format!("{action} {unit}").trim().to_string());
        if self.failing.contains(action) {
            return Err(ProvisionError::ServiceManager {
                action: action.to_string(),
                unit: unit.to_string(),
                reason: "exit status: 1".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

impl ServiceSupervisor for RecordingSupervisor {
    async fn install(&self, unit: &ServiceUnit) -> Result<()> {
        self.installed.borrow_mut().push(unit.clone());
        self.call("install", &unit.name)
    }
    async fn restart(&self, name: &str) -> Result<()> {
        self.call("restart", name)
    }
    async fn stop(&self, name: &str) -> Result<()> {
        self.call("stop", name)
    }
    async fn disable(&self, name: &str) -> Result<()> {
        self.call("disable", name)
    }
    async fn remove(&self, name: &str) -> Result<()> {
        self.call("remove", name)
    }
    async fn reload(&self) -> Result<()> {
        self.call("reload", "")
    }
    async fn query_status(&self, name: &str) -> ServiceStatus {
        self.calls.borrow_mut().push(format!("status {name}"));
        self.status.unwrap_or(ServiceStatus::Unknown)
    }
}

// ── Interactive driver ───────────────────────────────────────────────────────

/// Pretends to run an interactive program: materialises `creates` in the
/// shared filesystem and reports the configured outcome.
pub struct ScriptedDriver {
    pub fs: FakeFs,
    pub creates: Vec<(PathBuf, String)>,
    pub exit_code: i32,
    pub skipped: Vec<usize>,
    pub fail_spawn: bool,
    pub calls: RefCell<Vec<(String, Vec<String>, usize)>>,
}

impl ScriptedDriver {
    pub fn new(fs: &FakeFs) -> Self {
        Self {
            fs: fs.clone(),
            creates: Vec::new(),
            exit_code: 0,
            skipped: Vec::new(),
            fail_spawn: false,
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn creating(mut self, path: &str, content: &str) -> Self {
        self.creates.push((PathBuf::from(path), content.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<(String, Vec<String>, usize)> {
        self.calls.borrow().clone()
    }
}

impl InteractiveDriver for ScriptedDriver {
    async fn drive(
        &self,
        program: &str,
        args: &[&str],
        script: &ExpectScript,
        _overall_timeout: Option<Duration>,
    ) -> Result<DriveOutcome> {
        self.calls.borrow_mut().push((
            program.to_string(),
            args.iter().map(ToString::to_string).collect(),
            script.len(),
        ));
        if self.fail_spawn {
            return Err(ProvisionError::ProcessSpawn {
                program: program.to_string(),
                reason: "No such file or directory".to_string(),
            }
            .into());
        }
        for (path, content) in &self.creates {
            self.fs.put(path, content);
        }
        let answered = (0..script.len())
            .filter(|i| !self.skipped.contains(i))
            .collect();
        Ok(DriveOutcome {
            status: exit_status(self.exit_code),
            answered,
            skipped: self.skipped.clone(),
        })
    }
}

// ── Command runner ───────────────────────────────────────────────────────────

/// Returns one canned output for every command and records the calls.
pub struct FakeRunner {
    pub exit_code: i32,
    pub stderr: &'static str,
    pub calls: RefCell<Vec<String>>,
}

impl FakeRunner {
    pub fn ok() -> Self {
        Self::exiting(0, "")
    }

    pub fn exiting(exit_code: i32, stderr: &'static str) -> Self {
        Self {
            exit_code,
            stderr,
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn record(&self, program: &str, args: &[&str], dir: Option<&Path>) -> Output {
        let mut line = std::iter::once(program)
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ");
        if let Some(dir) = dir {
            line.push_str(&format!(" @ {}", dir.display()));
        }
        self.calls.borrow_mut().push(line);
        output(self.exit_code, self.stderr)
    }
}

impl CommandRunner for FakeRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output> {
        Ok(self.record(program, args, None))
    }
    async fn run_with_timeout(&self, program: &str, args: &[&str], _: Duration) -> Result<Output> {
        Ok(self.record(program, args, None))
    }
    async fn run_in_dir(
        &self,
        program: &str,
        args: &[&str],
        dir: &Path,
        _: Duration,
    ) -> Result<Output> {
        Ok(self.record(program, args, Some(dir)))
    }
}

// ── Remote source ────────────────────────────────────────────────────────────

/// Serves one release; downloads write `payload` into the shared filesystem.
pub struct FakeRemote {
    pub fs: FakeFs,
    pub tarball_url: Option<String>,
    pub payload: String,
    pub fail_download: bool,
    pub urls: RefCell<Vec<String>>,
}

impl FakeRemote {
    pub fn new(fs: &FakeFs) -> Self {
        Self {
            fs: fs.clone(),
            tarball_url: Some("https://example.test/ov-node.tar.gz".to_string()),
            payload: "#!/bin/bash\n".to_string(),
            fail_download: false,
            urls: RefCell::new(Vec::new()),
        }
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.borrow().clone()
    }
}

impl RemoteSource for FakeRemote {
    fn fetch_release(&self, url: &str) -> Result<ReleaseDescriptor> {
        self.urls.borrow_mut().push(url.to_string());
        match &self.tarball_url {
            Some(tarball_url) => Ok(ReleaseDescriptor {
                tarball_url: tarball_url.clone(),
            }),
            None => Err(ProvisionError::Network {
                url: url.to_string(),
                reason: "status code 404".to_string(),
            }
            .into()),
        }
    }

    fn download(&self, url: &str, dest: &Path) -> Result<u64> {
        self.urls.borrow_mut().push(url.to_string());
        if self.fail_download {
            return Err(ProvisionError::Network {
                url: url.to_string(),
                reason: "connection reset".to_string(),
            }
            .into());
        }
        self.fs.put(dest, &self.payload);
        Ok(self.payload.len() as u64)
    }
}

// ── Archive extractor ────────────────────────────────────────────────────────

/// "Extracts" a fixed set of files, relative to the destination.
pub struct FakeArchive {
    pub fs: FakeFs,
    pub entries: Vec<(String, String)>,
    pub fail: bool,
}

impl FakeArchive {
    pub fn new(fs: &FakeFs) -> Self {
        Self {
            fs: fs.clone(),
            entries: vec![
                ("main.py".to_string(), "print('node')\n".to_string()),
                (".env.example".to_string(), "API_KEY = \n".to_string()),
                (".env".to_string(), "API_KEY = shipped\n".to_string()),
            ],
            fail: false,
        }
    }
}

impl ArchiveExtractor for FakeArchive {
    fn extract_stripped(&self, archive: &Path, dest: &Path) -> Result<()> {
        if self.fail {
            bail!("corrupt archive {}", archive.display());
        }
        for (name, content) in &self.entries {
            self.fs.put(&dest.join(name), content);
        }
        Ok(())
    }
}

// ── Operator-facing fakes ────────────────────────────────────────────────────

/// Answers prompts in order; an empty or missing answer selects the default.
#[derive(Default)]
pub struct ScriptedPrompter {
    pub answers: RefCell<VecDeque<String>>,
    pub confirm_answer: bool,
    pub prompts: RefCell<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn answering(answers: &[&str]) -> Self {
        Self {
            answers: RefCell::new(answers.iter().map(ToString::to_string).collect()),
            ..Self::default()
        }
    }

    pub fn confirming() -> Self {
        Self {
            confirm_answer: true,
            ..Self::default()
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.borrow().clone()
    }
}

impl Prompter for ScriptedPrompter {
    fn ask(&self, prompt: &str, default: &str) -> Result<String> {
        self.prompts.borrow_mut().push(prompt.to_string());
        Ok(match self.answers.borrow_mut().pop_front() {
            Some(answer) if !answer.trim().is_empty() => answer,
            _ => default.to_string(),
        })
    }

    fn confirm(&self, prompt: &str) -> Result<bool> {
        self.prompts.borrow_mut().push(prompt.to_string());
        Ok(self.confirm_answer)
    }

    fn pause(&self, _: &str) -> Result<()> {
        Ok(())
    }
}

pub struct FixedAddress(pub Option<&'static str>);

impl HostAddress for FixedAddress {
    fn primary_ipv4(&self) -> Option<String> {
        self.0.map(str::to_string)
    }
}

#[derive(Default)]
pub struct RecordingReporter {
    pub steps: RefCell<Vec<String>>,
    pub successes: RefCell<Vec<String>>,
    pub warnings: RefCell<Vec<String>>,
}

impl RecordingReporter {
    pub fn steps(&self) -> Vec<String> {
        self.steps.borrow().clone()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.warnings.borrow().clone()
    }
}

impl ProgressReporter for RecordingReporter {
    fn step(&self, message: &str) {
        self.steps.borrow_mut().push(message.to_string());
    }
    fn success(&self, message: &str) {
        self.successes.borrow_mut().push(message.to_string());
    }
    fn warn(&self, message: &str) {
        self.warnings.borrow_mut().push(message.to_string());
    }
}

// ── Host assembly ────────────────────────────────────────────────────────────

pub type FakeHost =
    NodeHost<FakeFs, RecordingSupervisor, ScriptedDriver, FakeRunner, FakeRemote, FakeArchive>;

/// A host whose adapters all share `fs` and succeed.
pub fn fake_host(fs: &FakeFs) -> FakeHost {
    NodeHost {
        fs: fs.clone(),
        supervisor: RecordingSupervisor::default(),
        driver: ScriptedDriver::new(fs),
        runner: FakeRunner::ok(),
        remote: FakeRemote::new(fs),
        archive: FakeArchive::new(fs),
    }
}
