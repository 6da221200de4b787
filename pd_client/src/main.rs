//! Command-line client for tournament deal-making.
//!
//! Equity, deal and bot commands run locally unless `--server` is given.
//! Moderation commands always go to the server.

use anyhow::{Context, Result};
use pico_args::Arguments;
use poker_deal::{
    bot::{BotDecisionConfig, BotDecisionContext, BotDecisionMaker, DifficultyParams},
    equity::{
        DEFAULT_SIMULATION_TRIALS, EquityMethod, EquityModel, estimate_chip_chop,
        estimate_icm_equities,
    },
    tournament::{DealCalculator, TournamentSnapshot},
};
use rand::{SeedableRng, rngs::StdRng};
use std::fs;

use pd_client::{
    api_client::{AdjustmentQuery, ApiClient, BotQuery},
    commands::{BotArgs, Command, parse_command},
    report,
};

const HELP: &str = "\
Compute tournament deals and manage moderation

USAGE:
  pd_client [OPTIONS] <COMMAND> [ARGS]

OPTIONS:
  --server URL           Send requests to a deal server instead of computing locally
  --admin-token TOKEN    Admin bearer token  [default: env ADMIN_TOKEN]

COMMANDS:
  icm --stacks LIST --payouts LIST
  chop --stacks LIST --pool AMOUNT
  equity METHOD --stacks LIST --payouts LIST [--trials N] [--seed N]
      METHOD is approximate, chip-chop, exact or simulated
  deal --file SNAPSHOT.json [--method METHOD] [--trials N] [--seed N]
  bot --hole CARDS --pot N --chips N [--board CARDS] [--bet N] [--bb N]
      [--players N] [--position N] [--difficulty easy|standard|tag]
      [--aggression X] [--seed N]
  ban USER_ID --reason TEXT [--hours N] [--by NAME]     (server)
  unban USER_ID                                         (server)
  bans [--active]                                       (server)
  adjust USER_ID --wallet credits|diamonds --amount N
      --direction credit|debit --by NAME [--type T] [--key K]
      [--description TEXT]                              (server)
  history USER_ID [--limit N]                           (server)

FLAGS:
  -h, --help             Print help information

EXAMPLES:
  pd_client icm --stacks 5000,3000,2000 --payouts 500,300,200
  pd_client bot --hole \"As Kd\" --board \"2c 7h Td\" --pot 120 --chips 900
";

struct Args {
    server_url: Option<String>,
    admin_token: Option<String>,
    command: Command,
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut pargs = Arguments::from_env();

    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let server_url: Option<String> = pargs
        .opt_value_from_str("--server")
        .context("Invalid --server")?;
    let admin_token: Option<String> = pargs
        .opt_value_from_str("--admin-token")
        .context("Invalid --admin-token")?
        .or_else(|| std::env::var("ADMIN_TOKEN").ok());

    let args = Args {
        server_url,
        admin_token,
        command: parse_command(pargs)?,
    };

    let output = match args.server_url {
        Some(url) => {
            let mut client = ApiClient::new(url);
            if let Some(token) = args.admin_token {
                client = client.with_admin_token(token);
            }
            run_remote(&client, args.command).await?
        }
        None if args.command.requires_server() => {
            anyhow::bail!("This command needs --server URL");
        }
        None => run_local(args.command)?,
    };

    print!("{output}");
    Ok(())
}

fn run_local(command: Command) -> Result<String> {
    match command {
        Command::Icm { stacks, payouts } => {
            let equities = estimate_icm_equities(&stacks, &payouts);
            Ok(report::render_equities(
                EquityMethod::Approximate,
                &stacks,
                &equities,
            ))
        }
        Command::Chop { stacks, pool } => {
            let equities = estimate_chip_chop(&stacks, pool);
            Ok(report::render_equities(
                EquityMethod::ChipChop,
                &stacks,
                &equities,
            ))
        }
        Command::Equity {
            method,
            stacks,
            payouts,
            trials,
            seed,
        } => {
            let estimator = method.estimator(trials.unwrap_or(DEFAULT_SIMULATION_TRIALS), seed);
            let equities = estimator.equities(&stacks, &payouts)?;
            Ok(report::render_equities(method, &stacks, &equities))
        }
        Command::Deal {
            file,
            method,
            trials,
            seed,
        } => {
            let json = fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let snapshot = TournamentSnapshot::from_json(&json)?;
            let mut calculator = DealCalculator::new(method.unwrap_or_default());
            if let Some(trials) = trials {
                calculator = calculator.with_trials(trials);
            }
            if let Some(seed) = seed {
                calculator = calculator.with_seed(seed);
            }
            Ok(report::render_proposal(&calculator.propose(&snapshot)?))
        }
        Command::Bot(bot) => Ok(report::render_decision(&decide_locally(&bot))),
        other => anyhow::bail!("{other:?} needs --server URL"),
    }
}

fn decide_locally(bot: &BotArgs) -> poker_deal::bot::BotDecision {
    let mut params = DifficultyParams::from_difficulty(bot.difficulty);
    if let Some(aggression) = bot.aggression {
        params = params.with_aggression(aggression);
    }
    let ctx = BotDecisionContext {
        hole_cards: &bot.hole_cards,
        board_cards: &bot.board_cards,
        pot_size: bot.pot_size,
        current_bet: bot.current_bet,
        bot_chips: bot.bot_chips,
        big_blind: bot.big_blind,
        can_check: bot.current_bet == 0,
        position: bot.position,
        players_remaining: bot.players_remaining,
    };
    let rng = match bot.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    };
    BotDecisionMaker::with_rng(BotDecisionConfig::default(), rng).decide(&params, &ctx)
}

async fn run_remote(client: &ApiClient, command: Command) -> Result<String> {
    let output = match command {
        Command::Icm { stacks, payouts } => {
            let reply = client
                .equity(EquityMethod::Approximate, &stacks, &payouts, None, None)
                .await?;
            report::render_equities(reply.method, &stacks, &reply.equities)
        }
        Command::Chop { stacks, pool } => {
            let reply = client.chip_chop(&stacks, pool).await?;
            report::render_equities(reply.method, &stacks, &reply.equities)
        }
        Command::Equity {
            method,
            stacks,
            payouts,
            trials,
            seed,
        } => {
            let reply = client
                .equity(method, &stacks, &payouts, trials, seed)
                .await?;
            report::render_equities(reply.method, &stacks, &reply.equities)
        }
        Command::Deal {
            file,
            method,
            trials,
            seed,
        } => {
            let json = fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let snapshot: serde_json::Value =
                serde_json::from_str(&json).context("Snapshot file is not valid JSON")?;
            let proposal = client.propose_deal(snapshot, method, trials, seed).await?;
            report::render_proposal(&proposal)
        }
        Command::Bot(bot) => {
            let query = BotQuery {
                hole_cards: bot.hole_cards,
                board_cards: bot.board_cards,
                pot_size: bot.pot_size,
                current_bet: bot.current_bet,
                bot_chips: bot.bot_chips,
                big_blind: bot.big_blind,
                position: bot.position,
                players_remaining: bot.players_remaining,
                difficulty: bot.difficulty,
                aggression: bot.aggression,
                seed: bot.seed,
            };
            report::render_decision(&client.bot_decision(&query).await?)
        }
        Command::Ban {
            user_id,
            reason,
            hours,
            banned_by,
        } => {
            let banned_by = banned_by.unwrap_or_else(|| "admin".to_string());
            let ban = client
                .ban_user(&user_id, &reason, &banned_by, hours)
                .await?;
            format!("{}\n", report::render_ban(&ban))
        }
        Command::Unban { user_id } => {
            client.lift_ban(&user_id).await?;
            format!("Ban on {user_id} lifted\n")
        }
        Command::Bans { active } => {
            let bans = client.list_bans(active).await?;
            if bans.is_empty() {
                "No bans\n".to_string()
            } else {
                bans.iter()
                    .map(|ban| format!("{}\n", report::render_ban(ban)))
                    .collect()
            }
        }
        Command::Adjust(adjust) => {
            let query = AdjustmentQuery {
                user_id: adjust.user_id,
                wallet: adjust.wallet,
                amount: adjust.amount,
                direction: adjust.direction,
                entry_type: adjust.entry_type,
                idempotency_key: adjust.idempotency_key,
                description: adjust.description,
                performed_by: adjust.performed_by,
            };
            let entry = client.record_adjustment(&query).await?;
            format!("Recorded {}\n", report::render_entry(&entry))
        }
        Command::History { user_id, limit } => {
            let history = client.ledger_history(&user_id, limit).await?;
            let mut out = format!(
                "{}: net credits {:+}, net diamonds {:+}\n",
                history.user_id, history.net_credits, history.net_diamonds
            );
            for entry in &history.entries {
                out.push_str(&report::render_entry(entry));
                out.push('\n');
            }
            out
        }
    };
    Ok(output)
}
