//! JVM process launcher.
//!
//! [`JavaRunner`] binds an installed runtime to invocations described by
//! [`JavaInvocation`]. Arguments are always assembled in the same order:
//! `-D` defines, `-cp` with the joined classpath, the main class and finally
//! the optional positional argument (usually a rendered properties file).

use std::collections::BTreeMap;
use std::env;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus};
use std::sync::Arc;

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::ProcessFailure;

const RUNNER_TARGET: &str = "java_platform::runner";

#[cfg(windows)]
const JAVA_EXECUTABLE: &str = "java.exe";
#[cfg(not(windows))]
const JAVA_EXECUTABLE: &str = "java";

/// One JVM launch: entry point, classpath, system properties and argument.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JavaInvocation {
    main_class: String,
    classpath: Vec<PathBuf>,
    defines: BTreeMap<String, String>,
    argument: Option<OsString>,
    env: Vec<(OsString, OsString)>,
}

impl JavaInvocation {
    /// Starts an invocation of `main_class` with no classpath or defines.
    pub fn new(main_class: impl Into<String>) -> Self {
        Self {
            main_class: main_class.into(),
            ..Self::default()
        }
    }

    /// Appends classpath entries, preserving their order.
    #[must_use]
    pub fn classpath<I, P>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.classpath.extend(entries.into_iter().map(Into::into));
        self
    }

    /// Adds a `-Dname=value` system property, replacing an earlier value for
    /// the same name.
    #[must_use]
    pub fn define(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.defines.insert(name.into(), value.into());
        self
    }

    /// Adds several system properties.
    #[must_use]
    pub fn defines<I, K, V>(mut self, defines: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.defines
            .extend(defines.into_iter().map(|(key, value)| (key.into(), value.into())));
        self
    }

    /// Sets the positional argument passed after the main class.
    #[must_use]
    pub fn argument(mut self, argument: impl Into<OsString>) -> Self {
        self.argument = Some(argument.into());
        self
    }

    /// Sets an environment variable for the child process.
    #[must_use]
    pub fn env(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Fully-qualified entry point.
    #[must_use]
    pub fn main_class(&self) -> &str {
        &self.main_class
    }

    /// System properties, sorted by name.
    #[must_use]
    pub const fn defines_map(&self) -> &BTreeMap<String, String> {
        &self.defines
    }

    /// Command-line arguments in launch order, excluding the executable.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessFailure::InvalidClasspath`] when an entry contains
    /// the platform's path-list separator.
    pub fn arguments(&self) -> Result<Vec<OsString>, ProcessFailure> {
        let mut arguments: Vec<OsString> = self
            .defines
            .iter()
            .map(|(name, value)| OsString::from(format!("-D{name}={value}")))
            .collect();
        if !self.classpath.is_empty() {
            let joined = env::join_paths(&self.classpath).map_err(|error| {
                ProcessFailure::InvalidClasspath {
                    message: error.to_string(),
                }
            })?;
            arguments.push(OsString::from("-cp"));
            arguments.push(joined);
        }
        arguments.push(OsString::from(&self.main_class));
        if let Some(argument) = &self.argument {
            arguments.push(argument.clone());
        }
        Ok(arguments)
    }
}

/// Launches classes on an installed Java runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JavaRunner {
    java_home: PathBuf,
}

impl JavaRunner {
    /// Binds the runner to the runtime rooted at `java_home`.
    pub fn new(java_home: impl Into<PathBuf>) -> Self {
        Self {
            java_home: java_home.into(),
        }
    }

    /// Root of the runtime installation.
    #[must_use]
    pub fn java_home(&self) -> &Path {
        &self.java_home
    }

    /// Location of the `java` launcher.
    #[must_use]
    pub fn executable(&self) -> PathBuf {
        self.java_home.join("bin").join(JAVA_EXECUTABLE)
    }

    /// Runs `invocation` and blocks until the process exits.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessFailure`] when the runtime is missing, the process
    /// cannot be started or it exits with a non-zero status.
    pub fn run_class(&self, invocation: &JavaInvocation) -> Result<(), ProcessFailure> {
        self.start_class(invocation)?.wait()
    }

    /// Starts `invocation` and returns a handle to the running process.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessFailure`] when the runtime is missing or the process
    /// cannot be started.
    pub fn start_class(&self, invocation: &JavaInvocation) -> Result<JavaProcess, ProcessFailure> {
        let program = self.executable();
        if !program.is_file() {
            return Err(ProcessFailure::MissingRuntime { path: program });
        }
        let arguments = invocation.arguments()?;

        debug!(
            target: RUNNER_TARGET,
            program = %program.display(),
            main_class = invocation.main_class(),
            arguments = ?arguments,
            "spawning java process"
        );

        let mut command = Command::new(&program);
        command.args(&arguments);
        command.env("JAVA_HOME", &self.java_home);
        for (key, value) in &invocation.env {
            command.env(key, value);
        }
        let child = command.spawn().map_err(|source| ProcessFailure::Spawn {
            program: program.clone().into_os_string(),
            source: Arc::new(source),
        })?;

        info!(
            target: RUNNER_TARGET,
            pid = child.id(),
            main_class = invocation.main_class(),
            "java process started"
        );
        Ok(JavaProcess {
            child,
            main_class: invocation.main_class().to_owned(),
        })
    }
}

/// Handle to a running JVM.
#[derive(Debug)]
pub struct JavaProcess {
    child: Child,
    main_class: String,
}

impl JavaProcess {
    /// Operating-system process identifier.
    #[must_use]
    pub fn id(&self) -> u32 {
        self.child.id()
    }

    /// Entry point the process was started with.
    #[must_use]
    pub fn main_class(&self) -> &str {
        &self.main_class
    }

    /// Blocks until the process exits.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessFailure::NonZeroExit`] for an unsuccessful exit and
    /// [`ProcessFailure::Wait`] when the status cannot be collected.
    pub fn wait(mut self) -> Result<(), ProcessFailure> {
        let status = self.child.wait().map_err(|source| ProcessFailure::Wait {
            main_class: self.main_class.clone(),
            source: Arc::new(source),
        })?;
        self.check(status)
    }

    fn check(&self, status: ExitStatus) -> Result<(), ProcessFailure> {
        if status.success() {
            info!(
                target: RUNNER_TARGET,
                main_class = self.main_class.as_str(),
                "java process exited cleanly"
            );
            return Ok(());
        }
        warn!(
            target: RUNNER_TARGET,
            main_class = self.main_class.as_str(),
            code = ?status.code(),
            "java process failed"
        );
        Err(ProcessFailure::NonZeroExit {
            main_class: self.main_class.clone(),
            code: status.code(),
        })
    }
}

/// Lists every `.jar` file below `directories`.
///
/// Directories contribute their jars in the order given, so earlier
/// directories win when classes overlap. Within one directory the search
/// recurses and sorts by full path, keeping the classpath stable across
/// hosts whose directory listings differ in order.
///
/// # Errors
///
/// Returns [`ProcessFailure::Classpath`] when a directory is missing or
/// cannot be read.
pub fn classpath_for_jars_in_directories<I, P>(directories: I) -> Result<Vec<PathBuf>, ProcessFailure>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut jars = Vec::new();
    for directory in directories {
        jars.extend(jars_in_directory(directory.as_ref())?);
    }
    Ok(jars)
}

fn jars_in_directory(root: &Path) -> Result<Vec<PathBuf>, ProcessFailure> {
    if !root.is_dir() {
        return Err(ProcessFailure::Classpath {
            path: root.to_path_buf(),
            message: String::from("not a directory"),
        });
    }
    let mut jars = Vec::new();
    for walked in WalkDir::new(root).follow_links(true) {
        let entry = walked.map_err(|error| ProcessFailure::Classpath {
            path: root.to_path_buf(),
            message: error.to_string(),
        })?;
        if entry.file_type().is_file() && is_jar(entry.path()) {
            jars.push(entry.into_path());
        }
    }
    jars.sort();
    Ok(jars)
}

fn is_jar(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .is_some_and(|extension| extension.eq_ignore_ascii_case("jar"))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use rstest::rstest;

    use super::*;

    #[test]
    fn arguments_follow_launch_order() {
        let invocation = JavaInvocation::new("org.example.Main")
            .classpath(["/opt/a.jar", "/opt/b.jar"])
            .define("log4j.configuration", "file:/cfg/log4j.properties")
            .define("app.home", "/opt")
            .argument("/cfg/app.properties");

        let arguments = invocation.arguments().expect("arguments");
        let joined = env::join_paths(["/opt/a.jar", "/opt/b.jar"]).expect("join");
        assert_eq!(
            arguments,
            [
                OsString::from("-Dapp.home=/opt"),
                OsString::from("-Dlog4j.configuration=file:/cfg/log4j.properties"),
                OsString::from("-cp"),
                joined,
                OsString::from("org.example.Main"),
                OsString::from("/cfg/app.properties"),
            ]
        );
    }

    #[test]
    fn bare_invocation_is_just_the_main_class() {
        let arguments = JavaInvocation::new("Main").arguments().expect("arguments");
        assert_eq!(arguments, [OsString::from("Main")]);
    }

    #[test]
    fn later_defines_replace_earlier_ones() {
        let invocation = JavaInvocation::new("Main")
            .define("k", "first")
            .defines([("k", "second")]);
        assert_eq!(invocation.defines_map().get("k").map(String::as_str), Some("second"));
    }

    #[test]
    fn missing_runtime_is_reported() {
        let home = tempfile::tempdir().expect("tempdir");
        let runner = JavaRunner::new(home.path());
        let error = runner
            .run_class(&JavaInvocation::new("Main"))
            .expect_err("missing java must fail");
        assert!(
            matches!(error, ProcessFailure::MissingRuntime { ref path } if *path == runner.executable())
        );
    }

    #[rstest]
    #[case::flat(&["b.jar", "a.jar", "notes.txt"], 2)]
    #[case::nested(&["lib/x.jar", "y.JAR", "lib/deeper/z.jar"], 3)]
    #[case::empty(&[], 0)]
    fn classpath_lists_every_jar(#[case] files: &[&str], #[case] expected: usize) {
        let root = tempfile::tempdir().expect("tempdir");
        for file in files {
            let path = root.path().join(file);
            fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
            fs::write(&path, b"jar").expect("write");
        }

        let first = classpath_for_jars_in_directories([root.path()]).expect("classpath");
        let second = classpath_for_jars_in_directories([root.path()]).expect("classpath");

        assert_eq!(first.len(), expected);
        assert_eq!(first, second);
        assert!(first.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(first.iter().all(|jar| jar.is_absolute()));
    }

    #[test]
    fn classpath_keeps_directory_order_and_sorts_within_each() {
        let root = tempfile::tempdir().expect("tempdir");
        let overrides = root.path().join("z-override");
        let base = root.path().join("a-base");
        fs::create_dir_all(&overrides).expect("mkdir");
        fs::create_dir_all(base.join("lib")).expect("mkdir");
        fs::write(overrides.join("patched.jar"), b"").expect("write");
        fs::write(base.join("lib").join("util.jar"), b"").expect("write");
        fs::write(base.join("core.jar"), b"").expect("write");

        let jars = classpath_for_jars_in_directories([&overrides, &base]).expect("classpath");
        assert_eq!(
            jars,
            [
                overrides.join("patched.jar"),
                base.join("core.jar"),
                base.join("lib").join("util.jar"),
            ]
        );
    }

    #[test]
    fn missing_classpath_directory_is_reported() {
        let root = tempfile::tempdir().expect("tempdir");
        let error = classpath_for_jars_in_directories([root.path().join("absent")])
            .expect_err("missing directory must fail");
        assert!(matches!(error, ProcessFailure::Classpath { .. }));
    }

    #[cfg(unix)]
    mod unix {
        use std::os::unix::fs::PermissionsExt;

        use super::*;

        fn fake_runtime(script: &str) -> tempfile::TempDir {
            let home = tempfile::tempdir().expect("tempdir");
            let bin = home.path().join("bin");
            fs::create_dir_all(&bin).expect("mkdir");
            let java = bin.join("java");
            fs::write(&java, script).expect("write script");
            fs::set_permissions(&java, fs::Permissions::from_mode(0o755)).expect("chmod");
            home
        }

        #[test]
        fn passes_arguments_to_the_runtime() {
            let home = fake_runtime("#!/bin/sh\nprintf '%s\\n' \"$@\" > \"$ARGS_OUT\"\n");
            let output = home.path().join("args.txt");
            let invocation = JavaInvocation::new("org.example.Main")
                .define("a", "1")
                .argument("conf.properties")
                .env("ARGS_OUT", output.as_os_str());

            JavaRunner::new(home.path())
                .run_class(&invocation)
                .expect("run");

            let recorded = fs::read_to_string(&output).expect("read args");
            assert_eq!(recorded, "-Da=1\norg.example.Main\nconf.properties\n");
        }

        #[test]
        fn non_zero_exit_carries_the_code() {
            let home = fake_runtime("#!/bin/sh\nexit 3\n");
            let error = JavaRunner::new(home.path())
                .run_class(&JavaInvocation::new("org.example.Main"))
                .expect_err("exit 3 must fail");
            assert!(matches!(
                error,
                ProcessFailure::NonZeroExit { code: Some(3), ref main_class } if main_class == "org.example.Main"
            ));
        }

        #[test]
        fn started_process_can_be_awaited() {
            let home = fake_runtime("#!/bin/sh\nexit 0\n");
            let process = JavaRunner::new(home.path())
                .start_class(&JavaInvocation::new("Main"))
                .expect("start");
            assert!(process.id() > 0);
            process.wait().expect("clean exit");
        }
    }
}
