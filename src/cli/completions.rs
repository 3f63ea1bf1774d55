use clap::Parser;

/// Arguments for completions command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Generate bash completions:\n    flakepin completions bash > ~/.bash_completion.d/flakepin\n\n\
                  Generate zsh completions:\n    flakepin completions zsh > ~/.zfunc/_flakepin\n\n\
                  Generate fish completions:\n    flakepin completions fish > ~/.config/fish/completions/flakepin.fish\n\n\
                  Generate PowerShell completions:\n    flakepin completions powershell")]
pub struct CompletionsArgs {
    /// Shell type (bash, elvish, fish, powershell, zsh)
    pub shell: String,
}
