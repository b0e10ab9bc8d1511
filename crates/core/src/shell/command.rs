//! Command table
//!
//! Every shell command exists in a remote form and, where it makes sense, a
//! local form spelled with an `l` prefix. Both forms share one handler; the
//! [`Side`] picks the backend and working directory.

use std::str::FromStr;

use crate::error::Error;
use crate::shell::complete::CompletionKind;

/// Which side of the session a command operates on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Local,
    Remote,
}

impl Side {
    pub fn label(self) -> &'static str {
        match self {
            Side::Local => "local",
            Side::Remote => "remote",
        }
    }
}

/// A parsed command name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Cd(Side),
    Pwd(Side),
    Ls(Side),
    Browse(Side),
    Less(Side),
    Get,
    Put,
    Mkdir(Side),
    MkdirAll(Side),
    Rm(Side),
    Rmdir(Side),
    Rename,
    Help,
    Exit,
}

/// All command names, sorted
pub const NAMES: &[&str] = &[
    "cd", "exit", "get", "help", "lcd", "less", "ll", "lless", "lll", "lls", "lmkdir",
    "lmkdirall", "logout", "lpwd", "lrm", "lrmdir", "ls", "mkdir", "mkdirall", "put", "pwd",
    "rename", "rm", "rmdir",
];

const HELP: &str = "\
cd [path]              change remote directory (no argument: initial directory)
lcd [path]             change local directory (no argument: home directory)
pwd, lpwd              print remote / local directory
ls, lls [pattern...]   list remote / local files
ll, lll                browse remote / local files
less, lless <path>     view a remote / local file
get [name...]          download files or directories
put [name...]          upload files or directories
mkdir, lmkdir          create directories
mkdirall, lmkdirall    create directories with parents
rm, lrm                remove files
rmdir, lrmdir          remove directory trees
rename <old> <new>     rename a remote path
help                   show this help
exit, logout           end the session
";

impl Command {
    /// Name as typed at the prompt
    pub fn name(self) -> &'static str {
        use Side::{Local, Remote};
        match self {
            Command::Cd(Remote) => "cd",
            Command::Cd(Local) => "lcd",
            Command::Pwd(Remote) => "pwd",
            Command::Pwd(Local) => "lpwd",
            Command::Ls(Remote) => "ls",
            Command::Ls(Local) => "lls",
            Command::Browse(Remote) => "ll",
            Command::Browse(Local) => "lll",
            Command::Less(Remote) => "less",
            Command::Less(Local) => "lless",
            Command::Get => "get",
            Command::Put => "put",
            Command::Mkdir(Remote) => "mkdir",
            Command::Mkdir(Local) => "lmkdir",
            Command::MkdirAll(Remote) => "mkdirall",
            Command::MkdirAll(Local) => "lmkdirall",
            Command::Rm(Remote) => "rm",
            Command::Rm(Local) => "lrm",
            Command::Rmdir(Remote) => "rmdir",
            Command::Rmdir(Local) => "lrmdir",
            Command::Rename => "rename",
            Command::Help => "help",
            Command::Exit => "exit",
        }
    }

    /// Side whose working directory path arguments resolve against
    pub fn side(self) -> Side {
        match self {
            Command::Cd(side)
            | Command::Pwd(side)
            | Command::Ls(side)
            | Command::Browse(side)
            | Command::Less(side)
            | Command::Mkdir(side)
            | Command::MkdirAll(side)
            | Command::Rm(side)
            | Command::Rmdir(side) => side,
            Command::Put => Side::Local,
            Command::Get | Command::Rename | Command::Help | Command::Exit => Side::Remote,
        }
    }

    /// Kind of path argument tab completion offers, if any
    pub fn completion(self) -> Option<CompletionKind> {
        match self {
            Command::Cd(_) | Command::Rmdir(_) => Some(CompletionKind::DirsOnly),
            Command::Less(_) | Command::Get | Command::Put => Some(CompletionKind::Any),
            Command::Rm(_) => Some(CompletionKind::FilesOnly),
            _ => None,
        }
    }

    /// Whether the command accepts at most one path argument
    pub fn single_argument(self) -> bool {
        matches!(self, Command::Cd(_) | Command::Less(_))
    }

    pub fn help() -> &'static str {
        HELP
    }
}

impl FromStr for Command {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use Side::{Local, Remote};
        let command = match s {
            "cd" => Command::Cd(Remote),
            "lcd" => Command::Cd(Local),
            "pwd" => Command::Pwd(Remote),
            "lpwd" => Command::Pwd(Local),
            "ls" => Command::Ls(Remote),
            "lls" => Command::Ls(Local),
            "ll" => Command::Browse(Remote),
            "lll" => Command::Browse(Local),
            "less" => Command::Less(Remote),
            "lless" => Command::Less(Local),
            "get" => Command::Get,
            "put" => Command::Put,
            "mkdir" => Command::Mkdir(Remote),
            "lmkdir" => Command::Mkdir(Local),
            "mkdirall" => Command::MkdirAll(Remote),
            "lmkdirall" => Command::MkdirAll(Local),
            "rm" => Command::Rm(Remote),
            "lrm" => Command::Rm(Local),
            "rmdir" => Command::Rmdir(Remote),
            "lrmdir" => Command::Rmdir(Local),
            "rename" => Command::Rename,
            "help" => Command::Help,
            "exit" | "logout" => Command::Exit,
            other => return Err(Error::UnknownCommand(other.to_string())),
        };
        Ok(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_prefix_selects_side() {
        assert_eq!("cd".parse::<Command>().unwrap(), Command::Cd(Side::Remote));
        assert_eq!("lcd".parse::<Command>().unwrap(), Command::Cd(Side::Local));
        assert_eq!("lll".parse::<Command>().unwrap(), Command::Browse(Side::Local));
        assert_eq!("logout".parse::<Command>().unwrap(), Command::Exit);
    }

    #[test]
    fn test_parse_unknown() {
        let err = "frobnicate".parse::<Command>().unwrap_err();
        assert_eq!(err.to_string(), "unknown command: frobnicate");
    }

    #[test]
    fn test_names_round_trip() {
        for name in NAMES {
            let command: Command = name.parse().unwrap();
            if *name != "logout" {
                assert_eq!(command.name(), *name);
            }
        }
        let mut sorted = NAMES.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, NAMES);
    }

    #[test]
    fn test_transfer_sides() {
        assert_eq!(Command::Get.side(), Side::Remote);
        assert_eq!(Command::Put.side(), Side::Local);
    }

    #[test]
    fn test_completion_kinds() {
        assert_eq!(Command::Cd(Side::Local).completion(), Some(CompletionKind::DirsOnly));
        assert_eq!(Command::Less(Side::Remote).completion(), Some(CompletionKind::Any));
        assert_eq!(Command::Rm(Side::Remote).completion(), Some(CompletionKind::FilesOnly));
        assert_eq!(Command::Pwd(Side::Remote).completion(), None);
        assert!(Command::Cd(Side::Remote).single_argument());
        assert!(!Command::Get.single_argument());
    }
}
