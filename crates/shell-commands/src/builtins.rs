//! Builtin command catalog.
//!
//! Small by design: just enough surface to exercise every part of the
//! contract, from synchronous results and failure diagnostics to typed
//! effects, path-aware arguments, and one long-running streaming command.

use crate::{Command, CommandContext, CommandFuture, CommandResult, Effect, Registry};
use shell_vfs::Vfs;

pub fn install() -> Registry {
    let mut registry = Registry::new();
    registry.register(Echo);
    registry.register(Clear);
    registry.register(Pwd);
    registry.register(Cd);
    registry.register(Ls);
    registry.register(Cat);
    registry.register(Whoami);
    registry.register(Su);
    registry.register(History);
    registry.register(Sleep);
    registry.register(Github);

    let mut entries = registry.catalog();
    entries.push(("help", Help::SUMMARY));
    entries.sort();
    registry.register(Help { entries });
    registry
}

struct Help {
    entries: Vec<(&'static str, &'static str)>,
}

impl Help {
    const SUMMARY: &'static str = "list available commands";
}

impl Command for Help {
    fn name(&self) -> &'static str {
        "help"
    }
    fn summary(&self) -> &'static str {
        Self::SUMMARY
    }
    fn run(&self, _args: Vec<String>, _ctx: CommandContext) -> CommandFuture {
        let width = self
            .entries
            .iter()
            .map(|(name, _)| name.len())
            .max()
            .unwrap_or(0);
        let listing = self
            .entries
            .iter()
            .map(|(name, summary)| format!("{name:width$}  {summary}"))
            .collect::<Vec<_>>()
            .join("\r\n");
        Box::pin(async move { Ok(CommandResult::ok(listing)) })
    }
}

struct Echo;

impl Command for Echo {
    fn name(&self) -> &'static str {
        "echo"
    }
    fn summary(&self) -> &'static str {
        "print arguments"
    }
    fn run(&self, args: Vec<String>, _ctx: CommandContext) -> CommandFuture {
        Box::pin(async move { Ok(CommandResult::ok(args.join(" "))) })
    }
}

struct Clear;

impl Command for Clear {
    fn name(&self) -> &'static str {
        "clear"
    }
    fn summary(&self) -> &'static str {
        "clear the screen"
    }
    fn run(&self, _args: Vec<String>, _ctx: CommandContext) -> CommandFuture {
        Box::pin(async move { Ok(CommandResult::ok("").with_effect(Effect::ClearScreen)) })
    }
}

struct Pwd;

impl Command for Pwd {
    fn name(&self) -> &'static str {
        "pwd"
    }
    fn summary(&self) -> &'static str {
        "print the working directory"
    }
    fn run(&self, _args: Vec<String>, ctx: CommandContext) -> CommandFuture {
        Box::pin(async move { Ok(CommandResult::ok(ctx.cwd)) })
    }
}

struct Cd;

impl Command for Cd {
    fn name(&self) -> &'static str {
        "cd"
    }
    fn summary(&self) -> &'static str {
        "change the working directory"
    }
    fn run(&self, args: Vec<String>, ctx: CommandContext) -> CommandFuture {
        Box::pin(async move {
            let target = args.first().map(String::as_str).unwrap_or("/");
            let path = Vfs::resolve(&ctx.cwd, target);
            match ctx.vfs.stat_at(&path) {
                Some(entry) if entry.is_dir() => Ok(CommandResult::ok("")
                    .with_effect(Effect::SetCwd(Vfs::normalize(&path)))),
                Some(_) => Ok(CommandResult::fail(format!("cd: not a directory: {target}"))),
                None => Ok(CommandResult::fail(format!(
                    "cd: no such directory: {target}"
                ))),
            }
        })
    }
}

struct Ls;

impl Command for Ls {
    fn name(&self) -> &'static str {
        "ls"
    }
    fn summary(&self) -> &'static str {
        "list directory contents"
    }
    fn run(&self, args: Vec<String>, ctx: CommandContext) -> CommandFuture {
        Box::pin(async move {
            let target = args.first().map(String::as_str).unwrap_or(".");
            let path = Vfs::resolve(&ctx.cwd, target);
            match ctx.vfs.stat_at(&path) {
                Some(entry) if entry.is_dir() => {
                    let mut names: Vec<String> = entry
                        .children()
                        .iter()
                        .map(|c| {
                            if c.is_dir() {
                                format!("{}/", c.name())
                            } else {
                                c.name().to_string()
                            }
                        })
                        .collect();
                    names.sort();
                    Ok(CommandResult::ok(names.join("  ")))
                }
                Some(entry) => Ok(CommandResult::ok(entry.name().to_string())),
                None => Ok(CommandResult::fail(format!(
                    "ls: cannot access '{target}': no such entry"
                ))),
            }
        })
    }
}

struct Cat;

impl Command for Cat {
    fn name(&self) -> &'static str {
        "cat"
    }
    fn summary(&self) -> &'static str {
        "print file contents"
    }
    fn run(&self, args: Vec<String>, ctx: CommandContext) -> CommandFuture {
        Box::pin(async move {
            let Some(target) = args.first() else {
                return Ok(CommandResult::fail("cat: missing operand"));
            };
            let path = Vfs::resolve(&ctx.cwd, target);
            match ctx.vfs.stat_at(&path) {
                Some(entry) => match entry.content() {
                    Some(content) => Ok(CommandResult::ok(
                        content.trim_end_matches('\n').replace('\n', "\r\n"),
                    )),
                    None => Ok(CommandResult::fail(format!("cat: {target}: is a directory"))),
                },
                None => Ok(CommandResult::fail(format!(
                    "cat: {target}: no such file or directory"
                ))),
            }
        })
    }
}

struct Whoami;

impl Command for Whoami {
    fn name(&self) -> &'static str {
        "whoami"
    }
    fn summary(&self) -> &'static str {
        "print the current user"
    }
    fn run(&self, _args: Vec<String>, ctx: CommandContext) -> CommandFuture {
        Box::pin(async move { Ok(CommandResult::ok(ctx.user)) })
    }
}

struct Su;

impl Command for Su {
    fn name(&self) -> &'static str {
        "su"
    }
    fn summary(&self) -> &'static str {
        "switch the prompt user"
    }
    fn run(&self, args: Vec<String>, _ctx: CommandContext) -> CommandFuture {
        Box::pin(async move {
            let user = args.first().map(String::as_str).unwrap_or("root");
            if user.is_empty() || !user.chars().all(|c| c.is_alphanumeric() || c == '-') {
                return Ok(CommandResult::fail(format!("su: invalid user name '{user}'")));
            }
            Ok(CommandResult::ok("").with_effect(Effect::SetUser(user.to_string())))
        })
    }
}

struct History;

impl Command for History {
    fn name(&self) -> &'static str {
        "history"
    }
    fn summary(&self) -> &'static str {
        "show submitted commands"
    }
    fn run(&self, _args: Vec<String>, ctx: CommandContext) -> CommandFuture {
        Box::pin(async move {
            let listing = ctx
                .history
                .iter()
                .enumerate()
                .map(|(i, line)| format!("{:4}  {line}", i + 1))
                .collect::<Vec<_>>()
                .join("\r\n");
            Ok(CommandResult::ok(listing))
        })
    }
}

struct Github;

impl Github {
    const URL: &'static str = "https://github.com/kiosk-sh";
}

impl Command for Github {
    fn name(&self) -> &'static str {
        "github"
    }
    fn summary(&self) -> &'static str {
        "open the GitHub profile"
    }
    fn run(&self, _args: Vec<String>, _ctx: CommandContext) -> CommandFuture {
        Box::pin(async {
            Ok(
                CommandResult::ok(format!("Opening {} ...", Self::URL))
                    .with_effect(Effect::OpenUrl(Self::URL.to_string())),
            )
        })
    }
}

struct Sleep;

impl Command for Sleep {
    fn name(&self) -> &'static str {
        "sleep"
    }
    fn summary(&self) -> &'static str {
        "wait for a number of seconds, streaming progress"
    }
    fn run(&self, args: Vec<String>, ctx: CommandContext) -> CommandFuture {
        Box::pin(async move {
            let secs = match args.first() {
                None => 3u64,
                Some(raw) => match raw.parse::<u64>() {
                    Ok(n) if (1..=60).contains(&n) => n,
                    _ => {
                        return Ok(CommandResult::fail(format!(
                            "sleep: invalid duration '{}'",
                            args[0]
                        )));
                    }
                },
            };
            for elapsed in 1..=secs {
                tokio::select! {
                    _ = ctx.abort.cancelled() => {
                        // The dispatcher discards this result; returning early
                        // just stops the work promptly.
                        return Ok(CommandResult::ok(""));
                    }
                    _ = tokio::time::sleep(std::time::Duration::from_secs(1)) => {
                        let _ = ctx.lines.send(format!("slept {elapsed}/{secs}s")).await;
                    }
                }
            }
            Ok(CommandResult::ok(format!("done after {secs}s")))
        })
    }
}
