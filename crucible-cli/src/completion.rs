use camino::{Utf8Path, Utf8PathBuf};
use clap::CommandFactory;
use clap_complete::{generate, Shell};
use color_eyre::eyre::{bail, eyre, Result, WrapErr};
use color_eyre::owo_colors::OwoColorize;

const BIN_NAME: &str = "crucible";

/// Print a shell completion script, or install it for the current user.
pub fn completion<C: CommandFactory>(shell: Option<Shell>, print: bool) -> Result<()> {
    let shell = match shell {
        Some(shell) => shell,
        None => std::env::var("SHELL")
            .ok()
            .as_deref()
            .and_then(detect_shell)
            .ok_or_else(|| eyre!("Could not detect your shell, please specify it."))?,
    };
    let mut script = Vec::new();
    generate(shell, &mut C::command(), BIN_NAME, &mut script);
    if print {
        print!("{}", String::from_utf8_lossy(&script));
        return Ok(());
    }
    let home = std::env::var("HOME").wrap_err("HOME is not set")?;
    let Some(dst) = completion_file(shell, Utf8Path::new(&home)) else {
        bail!(
            "Automatic installation is not supported for {shell}. Use `{}` instead.",
            format!("crucible completion {shell} --print").bold()
        )
    };
    if let Some(parent) = dst.parent() {
        fs_err::create_dir_all(parent)?;
    }
    fs_err::write(&dst, script)?;
    eprintln!("Installed {shell} completions to {}", dst.green());
    if shell == Shell::Zsh {
        eprintln!(
            "Make sure {} is in your fpath, e.g. add `{}` to ~/.zshrc before compinit.",
            "~/.zfunc".bold(),
            "fpath+=~/.zfunc".bold()
        );
    }
    Ok(())
}

/// Guess the shell from the value of `$SHELL`, e.g. `/usr/bin/zsh`.
fn detect_shell(shell_env: &str) -> Option<Shell> {
    let name = shell_env.rsplit('/').next()?;
    match name {
        "bash" => Some(Shell::Bash),
        "zsh" => Some(Shell::Zsh),
        "fish" => Some(Shell::Fish),
        "elvish" => Some(Shell::Elvish),
        "pwsh" | "powershell" => Some(Shell::PowerShell),
        _ => None,
    }
}

/// Where completion scripts are picked up automatically.
fn completion_file(shell: Shell, home: &Utf8Path) -> Option<Utf8PathBuf> {
    match shell {
        Shell::Bash => Some(home.join(".local/share/bash-completion/completions").join(BIN_NAME)),
        Shell::Zsh => Some(home.join(".zfunc").join(format!("_{BIN_NAME}"))),
        Shell::Fish => Some(home.join(".config/fish/completions").join(format!("{BIN_NAME}.fish"))),
        _ => None,
    }
}
