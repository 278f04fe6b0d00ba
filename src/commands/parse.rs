use super::CommandError;
use duct::{cmd, Expression};
use duct_sh::sh_dangerous;
use log::{trace, warn};

/// Whether the command looks like it relies on shell features (variables, pipes, chaining).
fn looks_like_shell(command: &str) -> bool {
    let uses_variables = command.match_indices('$').any(|(pos, _)| {
        command[pos + 1..]
            .chars()
            .next()
            .is_some_and(|ch| ch.is_ascii_alphabetic() || ch == '{')
    });
    let uses_operators = [" | ", " && ", " || ", " > ", " < "]
        .iter()
        .any(|operator| command.contains(operator));

    uses_variables || uses_operators
}

/// Turn a user-defined command into an expression.
///
/// In a shell the command is passed as-is to `/bin/sh` (`cmd.exe` on Windows),
/// otherwise it is split with shell quoting rules and run directly.
pub fn parse_command(command: &str, runs_in_shell: bool) -> Result<Expression, CommandError> {
    if runs_in_shell {
        // We can run `sh_dangerous`, because the commands come from the operator.
        return Ok(sh_dangerous(command));
    }

    if looks_like_shell(command) {
        warn!("The command {command:?} contains a variable or other shell-specific character: you might want to run it in a shell (--shell).");
    }

    let parts = shlex::split(command).ok_or_else(|| CommandError::Unparseable(command.to_string()))?;
    let (program, args) = parts
        .split_first()
        .ok_or_else(|| CommandError::Unparseable(command.to_string()))?;
    let expression = cmd(program, args);

    trace!("Parsed {command:?} to {expression:?}.");

    Ok(expression)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::run_command;

    #[test]
    fn it_should_detect_shell_features() {
        assert!(looks_like_shell("echo $HOME"));
        assert!(looks_like_shell("echo ${HOME}"));
        assert!(looks_like_shell("cargo test && echo done"));
        assert!(looks_like_shell("cat log | grep error"));
        assert!(!looks_like_shell("cargo test --all"));
        assert!(!looks_like_shell("echo $1 costs $"));
    }

    #[test]
    fn it_should_split_quoted_arguments() -> Result<(), CommandError> {
        let expression = parse_command("echo 'hello world'", false)?.stdout_capture();

        let output = run_command(&expression, None)?;
        assert_eq!("hello world\n", output.stdout);

        Ok(())
    }

    #[test]
    fn it_should_run_in_shell() -> Result<(), CommandError> {
        let expression = parse_command("echo one && echo two", true)?.stdout_capture();

        let output = run_command(&expression, None)?;
        assert_eq!("one\ntwo\n", output.stdout);

        Ok(())
    }

    #[test]
    fn it_should_fail_on_empty_or_unbalanced_commands() {
        let result = parse_command("", false);
        assert!(
            matches!(result, Err(CommandError::Unparseable(_))),
            "{result:?} should be Unparseable"
        );

        let result = parse_command("echo 'unbalanced", false);
        assert!(
            matches!(result, Err(CommandError::Unparseable(_))),
            "{result:?} should be Unparseable"
        );
    }
}
