use clap::Command;
use clap_complete::{generate, Shell};
use std::io;

pub fn display_banner() {
    println!("gitverse {}", env!("CARGO_PKG_VERSION"));
    println!("GitHub repository health, scored and summarized.\n");
    println!("  gitverse analyze https://github.com/owner/repo");
    println!("  gitverse serve --bind 127.0.0.1:3000");
    println!("\nRun `gitverse --help` for everything else.");
}

pub fn generate_completions(shell: Shell, cmd: &mut Command) {
    generate(shell, cmd, "gitverse", &mut io::stdout());

    eprintln!();
    eprintln!("Save the output to the appropriate location for your shell:");
    match shell {
        Shell::Bash => {
            eprintln!("  gitverse completions bash > ~/.local/share/bash-completion/completions/gitverse");
        }
        Shell::Zsh => {
            eprintln!("  gitverse completions zsh > ~/.zsh/completions/_gitverse");
            eprintln!("  # (Add 'fpath=(~/.zsh/completions $fpath)' before 'compinit' in .zshrc)");
        }
        Shell::Fish => {
            eprintln!("  gitverse completions fish > ~/.config/fish/completions/gitverse.fish");
        }
        _ => {}
    }
}
