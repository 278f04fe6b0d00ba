use super::Repository;
use crate::commands::{run_command, CommandError, CommandOutput};
use duct::cmd;
use log::debug;
use std::{collections::HashMap, time::Duration};

/// The default path of the git executable.
pub const DEFAULT_GIT_COMMAND: &str = "/usr/bin/git";

/// The environment git runs in, if nothing else is configured.
pub fn default_env() -> HashMap<String, String> {
    HashMap::from([("GIT_SSH_COMMAND".to_string(), "/usr/bin/ssh".to_string())])
}

/// A working tree, updated by calling the git executable.
///
/// Every command runs with exactly the configured environment, nothing is
/// inherited from the current process.
pub struct GitRepository {
    git: String,
    directory: String,
    env: HashMap<String, String>,
    timeout: Option<Duration>,
}

impl GitRepository {
    /// Creates a repository in the directory, with the default git path and environment.
    pub fn new(directory: String) -> Self {
        GitRepository {
            git: DEFAULT_GIT_COMMAND.to_string(),
            directory,
            env: default_env(),
            timeout: None,
        }
    }

    pub fn with_git(mut self, git: String) -> Self {
        self.git = git;
        self
    }

    pub fn with_env(mut self, env: HashMap<String, String>) -> Self {
        self.env = env;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn git(&self, args: &[&str]) -> Result<CommandOutput, CommandError> {
        debug!(
            "Running {} {} in directory {}.",
            self.git,
            args.join(" "),
            self.directory
        );
        let expression = cmd(&self.git, args)
            .full_env(&self.env)
            .dir(&self.directory)
            .stdout_capture()
            .stderr_capture();

        run_command(&expression, self.timeout)
    }
}

impl Repository for GitRepository {
    fn pull(&self) -> Result<CommandOutput, CommandError> {
        self.git(&["pull"])
    }

    fn abort_merge(&self) -> Result<CommandOutput, CommandError> {
        self.git(&["merge", "--abort"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use duct::cmd;
    use rand::distributions::{Alphanumeric, DistString};
    use std::{env, error::Error, fs, path::Path};

    fn get_random_id() -> String {
        Alphanumeric.sample_string(&mut rand::thread_rng(), 16)
    }

    fn test_env() -> HashMap<String, String> {
        let mut env: HashMap<String, String> = env::vars()
            .filter(|(k, _)| k == "PATH" || k == "HOME")
            .collect();
        env.extend(default_env());
        env
    }

    fn commit(path: &str, file: &str, content: &str) -> Result<(), Box<dyn Error>> {
        fs::write(format!("{path}/{file}"), content)?;
        cmd!("git", "add", "-A").dir(path).read()?;
        cmd!(
            "git",
            "-c",
            "user.name=test",
            "-c",
            "user.email=test@example.com",
            "commit",
            "-m",
            file
        )
        .dir(path)
        .read()?;

        Ok(())
    }

    fn create_repository(local: &str) -> Result<(), Box<dyn Error>> {
        let remote = format!("{local}-remote");

        fs::create_dir_all(&remote)?;
        cmd!("git", "init", "--bare").dir(&remote).read()?;
        cmd!("git", "clone", &remote, local).read()?;
        commit(local, "1", "1")?;
        cmd!("git", "push", "origin", "HEAD").dir(local).read()?;

        Ok(())
    }

    fn push_from_other_repository(local: &str) -> Result<(), Box<dyn Error>> {
        let remote = format!("{local}-remote");
        let other = format!("{local}-other");

        cmd!("git", "clone", &remote, &other).read()?;
        commit(&other, "2", "2")?;
        cmd!("git", "push", "origin", "HEAD").dir(&other).read()?;

        Ok(())
    }

    fn cleanup_repository(local: &str) -> Result<(), Box<dyn Error>> {
        for path in [
            local.to_string(),
            format!("{local}-remote"),
            format!("{local}-other"),
        ] {
            if Path::new(&path).exists() {
                fs::remove_dir_all(path)?;
            }
        }

        Ok(())
    }

    #[test]
    fn it_should_create_with_defaults() {
        let repository = GitRepository::new(String::from("."));

        assert_eq!(DEFAULT_GIT_COMMAND, repository.git);
        assert_eq!(".", repository.directory);
        assert_eq!(
            Some(&String::from("/usr/bin/ssh")),
            repository.env.get("GIT_SSH_COMMAND")
        );
        assert_eq!(None, repository.timeout);
    }

    #[test]
    fn it_should_pull_new_commits() -> Result<(), Box<dyn Error>> {
        let id = get_random_id();
        let local = format!("test_directories/{id}");

        create_repository(&local)?;
        push_from_other_repository(&local)?;

        let repository = GitRepository::new(local.clone())
            .with_git(String::from("git"))
            .with_env(test_env());
        let output = repository.pull()?;
        assert!(output.success(), "{output:?} should be successful");

        // The pushed file should be pulled
        assert!(Path::new(&format!("{local}/2")).exists());

        cleanup_repository(&local)?;

        Ok(())
    }

    #[test]
    fn it_should_return_stderr_if_pull_fails() -> Result<(), Box<dyn Error>> {
        let id = get_random_id();
        let local = format!("test_directories/{id}");

        // A repository without any remote cannot be pulled
        fs::create_dir_all(&local)?;
        cmd!("git", "init").dir(&local).read()?;

        let repository = GitRepository::new(local.clone())
            .with_git(String::from("git"))
            .with_env(test_env());
        let output = repository.pull()?;
        assert!(!output.success());
        assert!(!output.stderr.is_empty());

        // There is no merge in progress, so the abort fails as well
        let output = repository.abort_merge()?;
        assert!(!output.success());

        cleanup_repository(&local)?;

        Ok(())
    }

    #[test]
    fn it_should_fail_if_git_is_missing() {
        let repository =
            GitRepository::new(String::from(".")).with_git(String::from("/path/to/nowhere"));

        let result = repository.pull();
        assert!(
            matches!(result, Err(CommandError::Spawn(_))),
            "{result:?} should be Spawn"
        );
    }
}
