//! Subcommand parsing.

use pico_args::Arguments;
use poker_deal::{bot::BotDifficulty, cards::Card, equity::EquityMethod};
use std::{fmt, path::PathBuf, str::FromStr};

/// Errors that can occur during command parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// No subcommand given.
    MissingCommand,
    /// Unrecognized subcommand.
    UnrecognizedCommand(String),
    /// A required option or positional argument is absent.
    MissingArgument(&'static str),
    /// A list entry is not a non-negative number.
    InvalidAmount(String),
    /// A card does not parse, e.g. `"Zx"`.
    InvalidCard(String),
    /// Any other malformed option value.
    InvalidValue { arg: &'static str, reason: String },
    /// Arguments left over after parsing.
    UnexpectedArguments(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCommand => write!(f, "No command given. Run with --help for usage"),
            Self::UnrecognizedCommand(cmd) => write!(
                f,
                "Unrecognized command '{cmd}'. Run with --help for usage"
            ),
            Self::MissingArgument(arg) => write!(f, "Missing required argument {arg}"),
            Self::InvalidAmount(value) => write!(
                f,
                "Invalid amount '{value}'. Must be a non-negative number (e.g., '5000,3000,2000')"
            ),
            Self::InvalidCard(value) => {
                write!(f, "Invalid card '{value}'. Use short form such as 'As' or 'Td'")
            }
            Self::InvalidValue { arg, reason } => write!(f, "Invalid value for {arg}: {reason}"),
            Self::UnexpectedArguments(rest) => write!(f, "Unexpected arguments: {rest}"),
        }
    }
}

impl std::error::Error for ParseError {}

/// Inputs of the bot subcommand.
#[derive(Debug, Clone, PartialEq)]
pub struct BotArgs {
    pub hole_cards: Vec<Card>,
    pub board_cards: Vec<Card>,
    pub pot_size: u32,
    pub current_bet: u32,
    pub bot_chips: u32,
    pub big_blind: u32,
    pub position: Option<usize>,
    pub players_remaining: usize,
    pub difficulty: BotDifficulty,
    pub aggression: Option<f32>,
    pub seed: Option<u64>,
}

/// Inputs of the adjust subcommand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdjustArgs {
    pub user_id: String,
    pub wallet: String,
    pub amount: i64,
    pub direction: String,
    pub entry_type: Option<String>,
    pub idempotency_key: Option<String>,
    pub description: Option<String>,
    pub performed_by: String,
}

/// A parsed subcommand.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Icm {
        stacks: Vec<f64>,
        payouts: Vec<f64>,
    },
    Chop {
        stacks: Vec<f64>,
        pool: f64,
    },
    Equity {
        method: EquityMethod,
        stacks: Vec<f64>,
        payouts: Vec<f64>,
        trials: Option<usize>,
        seed: Option<u64>,
    },
    Deal {
        file: PathBuf,
        method: Option<EquityMethod>,
        trials: Option<usize>,
        seed: Option<u64>,
    },
    Bot(BotArgs),
    Ban {
        user_id: String,
        reason: String,
        hours: Option<i64>,
        banned_by: Option<String>,
    },
    Unban {
        user_id: String,
    },
    Bans {
        active: bool,
    },
    Adjust(AdjustArgs),
    History {
        user_id: String,
        limit: Option<i64>,
    },
}

impl Command {
    /// Whether the command can only run against a server.
    pub fn requires_server(&self) -> bool {
        matches!(
            self,
            Command::Ban { .. }
                | Command::Unban { .. }
                | Command::Bans { .. }
                | Command::Adjust(_)
                | Command::History { .. }
        )
    }
}

/// Parse the subcommand and its options.
///
/// Global options must already be taken out of `args`.
///
/// # Examples
///
/// ```
/// use pd_client::commands::{Command, parse_command};
/// use pico_args::Arguments;
///
/// let args = Arguments::from_vec(
///     ["icm", "--stacks", "5000,3000,2000", "--payouts", "500,300,200"]
///         .iter()
///         .map(Into::into)
///         .collect(),
/// );
/// let command = parse_command(args).unwrap();
/// assert!(matches!(command, Command::Icm { .. }));
/// ```
pub fn parse_command(mut args: Arguments) -> Result<Command, ParseError> {
    let name = args
        .subcommand()
        .map_err(|e| invalid("COMMAND", e))?
        .ok_or(ParseError::MissingCommand)?;

    let command = match name.as_str() {
        "icm" => Command::Icm {
            stacks: amounts(&mut args, "--stacks")?,
            payouts: amounts(&mut args, "--payouts")?,
        },
        "chop" => Command::Chop {
            stacks: amounts(&mut args, "--stacks")?,
            pool: required(&mut args, "--pool")?,
        },
        "equity" => {
            let method: String = args
                .free_from_str()
                .map_err(|_| ParseError::MissingArgument("METHOD"))?;
            Command::Equity {
                method: method.parse().map_err(|e| invalid("METHOD", e))?,
                stacks: amounts(&mut args, "--stacks")?,
                payouts: amounts(&mut args, "--payouts")?,
                trials: optional(&mut args, "--trials")?,
                seed: optional(&mut args, "--seed")?,
            }
        }
        "deal" => Command::Deal {
            file: required(&mut args, "--file")?,
            method: optional::<String>(&mut args, "--method")?
                .map(|m| m.parse().map_err(|e| invalid("--method", e)))
                .transpose()?,
            trials: optional(&mut args, "--trials")?,
            seed: optional(&mut args, "--seed")?,
        },
        "bot" => Command::Bot(parse_bot(&mut args)?),
        "ban" => Command::Ban {
            user_id: positional(&mut args, "USER_ID")?,
            reason: required(&mut args, "--reason")?,
            hours: optional(&mut args, "--hours")?,
            banned_by: optional(&mut args, "--by")?,
        },
        "unban" => Command::Unban {
            user_id: positional(&mut args, "USER_ID")?,
        },
        "bans" => Command::Bans {
            active: args.contains("--active"),
        },
        "adjust" => Command::Adjust(AdjustArgs {
            user_id: positional(&mut args, "USER_ID")?,
            wallet: required(&mut args, "--wallet")?,
            amount: required(&mut args, "--amount")?,
            direction: required(&mut args, "--direction")?,
            entry_type: optional(&mut args, "--type")?,
            idempotency_key: optional(&mut args, "--key")?,
            description: optional(&mut args, "--description")?,
            performed_by: required(&mut args, "--by")?,
        }),
        "history" => Command::History {
            user_id: positional(&mut args, "USER_ID")?,
            limit: optional(&mut args, "--limit")?,
        },
        other => return Err(ParseError::UnrecognizedCommand(other.to_string())),
    };

    let rest = args.finish();
    if !rest.is_empty() {
        let rest: Vec<String> = rest
            .iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect();
        return Err(ParseError::UnexpectedArguments(rest.join(" ")));
    }
    Ok(command)
}

fn parse_bot(args: &mut Arguments) -> Result<BotArgs, ParseError> {
    let hole: String = required(args, "--hole")?;
    let hole_cards = parse_cards(&hole)?;
    if hole_cards.len() != 2 {
        return Err(invalid("--hole", "exactly two cards are required"));
    }
    let board_cards = match optional::<String>(args, "--board")? {
        Some(board) => parse_cards(&board)?,
        None => Vec::new(),
    };
    let difficulty = match optional::<String>(args, "--difficulty")? {
        Some(d) => match d.to_lowercase().as_str() {
            "easy" => BotDifficulty::Easy,
            "standard" => BotDifficulty::Standard,
            "tag" => BotDifficulty::Tag,
            _ => return Err(invalid("--difficulty", "expected easy, standard or tag")),
        },
        None => BotDifficulty::default(),
    };

    Ok(BotArgs {
        hole_cards,
        board_cards,
        pot_size: required(args, "--pot")?,
        current_bet: optional(args, "--bet")?.unwrap_or(0),
        bot_chips: required(args, "--chips")?,
        big_blind: optional(args, "--bb")?.unwrap_or(0),
        position: optional(args, "--position")?,
        players_remaining: optional(args, "--players")?.unwrap_or(2),
        difficulty,
        aggression: optional(args, "--aggression")?,
        seed: optional(args, "--seed")?,
    })
}

/// Parse a comma or space separated list of non-negative amounts.
///
/// ```
/// use pd_client::commands::parse_amounts;
///
/// assert_eq!(parse_amounts("5000, 3000 2000").unwrap(), vec![5000.0, 3000.0, 2000.0]);
/// assert!(parse_amounts("100,-5").is_err());
/// ```
pub fn parse_amounts(input: &str) -> Result<Vec<f64>, ParseError> {
    split_list(input)
        .map(|item| match item.parse::<f64>() {
            Ok(value) if value.is_finite() && value >= 0.0 => Ok(value),
            _ => Err(ParseError::InvalidAmount(item.to_string())),
        })
        .collect()
}

/// Parse cards in short form, e.g. `"As Kd"` or `"As,Kd"`.
pub fn parse_cards(input: &str) -> Result<Vec<Card>, ParseError> {
    split_list(input)
        .map(|item| Card::from_str(item).map_err(|_| ParseError::InvalidCard(item.to_string())))
        .collect()
}

fn split_list(input: &str) -> impl Iterator<Item = &str> {
    input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|item| !item.is_empty())
}

fn amounts(args: &mut Arguments, key: &'static str) -> Result<Vec<f64>, ParseError> {
    let raw: String = required(args, key)?;
    parse_amounts(&raw)
}

fn required<T>(args: &mut Arguments, key: &'static str) -> Result<T, ParseError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    optional(args, key)?.ok_or(ParseError::MissingArgument(key))
}

fn optional<T>(args: &mut Arguments, key: &'static str) -> Result<Option<T>, ParseError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    args.opt_value_from_str(key).map_err(|e| invalid(key, e))
}

fn positional(args: &mut Arguments, name: &'static str) -> Result<String, ParseError> {
    args.opt_free_from_str()
        .map_err(|e| invalid(name, e))?
        .ok_or(ParseError::MissingArgument(name))
}

fn invalid(arg: &'static str, reason: impl fmt::Display) -> ParseError {
    ParseError::InvalidValue {
        arg,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Command, ParseError> {
        parse_command(Arguments::from_vec(args.iter().map(Into::into).collect()))
    }

    #[test]
    fn test_parse_icm() {
        assert_eq!(
            parse(&["icm", "--stacks", "5000,3000,2000", "--payouts", "500,300,200"]).unwrap(),
            Command::Icm {
                stacks: vec![5000.0, 3000.0, 2000.0],
                payouts: vec![500.0, 300.0, 200.0],
            }
        );
    }

    #[test]
    fn test_parse_equity_with_alias() {
        let command = parse(&[
            "equity",
            "monte-carlo",
            "--stacks",
            "10,20",
            "--payouts",
            "30",
            "--trials",
            "500",
            "--seed",
            "9",
        ])
        .unwrap();
        assert_eq!(
            command,
            Command::Equity {
                method: EquityMethod::Simulated,
                stacks: vec![10.0, 20.0],
                payouts: vec![30.0],
                trials: Some(500),
                seed: Some(9),
            }
        );
    }

    #[test]
    fn test_unknown_method() {
        let err = parse(&["equity", "coinflip", "--stacks", "1", "--payouts", "1"]).unwrap_err();
        assert!(matches!(err, ParseError::InvalidValue { arg: "METHOD", .. }));
    }

    #[test]
    fn test_parse_bot() {
        let Command::Bot(bot) = parse(&[
            "bot",
            "--hole",
            "As Kd",
            "--board",
            "2c,7h,Td",
            "--pot",
            "120",
            "--chips",
            "900",
            "--difficulty",
            "TAG",
        ])
        .unwrap() else {
            panic!("expected bot command");
        };
        assert_eq!(bot.hole_cards.len(), 2);
        assert_eq!(bot.board_cards.len(), 3);
        assert_eq!(bot.difficulty, BotDifficulty::Tag);
        assert_eq!(bot.players_remaining, 2);
    }

    #[test]
    fn test_bot_needs_two_hole_cards() {
        let err = parse(&["bot", "--hole", "As", "--pot", "1", "--chips", "1"]).unwrap_err();
        assert!(matches!(err, ParseError::InvalidValue { arg: "--hole", .. }));
    }

    #[test]
    fn test_invalid_card() {
        assert_eq!(
            parse_cards("As Zx").unwrap_err(),
            ParseError::InvalidCard("Zx".to_string())
        );
    }

    #[test]
    fn test_missing_and_unknown() {
        assert_eq!(parse(&[]).unwrap_err(), ParseError::MissingCommand);
        assert_eq!(
            parse(&["shuffle"]).unwrap_err(),
            ParseError::UnrecognizedCommand("shuffle".to_string())
        );
        assert_eq!(
            parse(&["icm", "--stacks", "1,2"]).unwrap_err(),
            ParseError::MissingArgument("--payouts")
        );
    }

    #[test]
    fn test_leftover_arguments() {
        let err = parse(&["unban", "u-1", "extra"]).unwrap_err();
        assert_eq!(err, ParseError::UnexpectedArguments("extra".to_string()));
    }

    #[test]
    fn test_admin_commands_require_server() {
        assert!(parse(&["unban", "u-1"]).unwrap().requires_server());
        assert!(parse(&["bans", "--active"]).unwrap().requires_server());
        assert!(
            !parse(&["chop", "--stacks", "1,2", "--pool", "10"])
                .unwrap()
                .requires_server()
        );
    }

    #[test]
    fn test_parse_adjust() {
        let Command::Adjust(adjust) = parse(&[
            "adjust",
            "u-7",
            "--wallet",
            "credits",
            "--amount",
            "250",
            "--direction",
            "credit",
            "--key",
            "bonus-1",
            "--by",
            "ops",
        ])
        .unwrap() else {
            panic!("expected adjust command");
        };
        assert_eq!(adjust.user_id, "u-7");
        assert_eq!(adjust.amount, 250);
        assert_eq!(adjust.idempotency_key.as_deref(), Some("bonus-1"));
        assert_eq!(adjust.entry_type, None);
    }
}
