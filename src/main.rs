use clap::{Arg, ArgAction, ArgMatches, Command};
use log::error;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;

use magic_link_auth::auth::{
    ChallengeIssuer, ChallengeOrchestrator, ChallengeVerifier, CreateChallengeRequest,
    CreateChallengeResponse, DefineChallengeRequest, DefineChallengeResponse,
    VerifyChallengeRequest, VerifyChallengeResponse,
};
use magic_link_auth::email::{
    setup_smtp_credentials, test_email_configuration, ConsoleNotifier, Notifier, SmtpNotifier,
};
use magic_link_auth::security::SecureSigningKey;
use magic_link_auth::utils::io::read_event_source;
use magic_link_auth::utils::logging::initialize_logging;
use magic_link_auth::{MagicLinkConfig, LOG_FILE};

fn event_arg() -> Arg {
    Arg::new("event")
        .long("event")
        .value_name("FILE")
        .help("Read the JSON event from FILE instead of stdin")
}

fn cli() -> Command {
    Command::new("magic-link-auth")
        .about("Passwordless magic-link custom-challenge handlers")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("define")
                .about("Decide the next step of an authentication attempt")
                .arg(event_arg()),
        )
        .subcommand(
            Command::new("create")
                .about("Mint a magic token and email the sign-in link")
                .arg(event_arg())
                .arg(
                    Arg::new("dry-run")
                        .long("dry-run")
                        .help("Print the email to stderr instead of sending it")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("verify")
                .about("Check a challenge answer against the issued token")
                .arg(event_arg()),
        )
        .subcommand(
            Command::new("init-key")
                .about("Generate a signing key in the system keyring if none exists"),
        )
        .subcommand(
            Command::new("setup-smtp")
                .about("Store SMTP credentials in the system keyring")
                .arg(Arg::new("host").long("host").required(true).help("SMTP server hostname"))
                .arg(
                    Arg::new("port")
                        .long("port")
                        .default_value("587")
                        .value_parser(clap::value_parser!(u16))
                        .help("SMTP server port"),
                )
                .arg(
                    Arg::new("username")
                        .long("username")
                        .required(true)
                        .help("SMTP account name"),
                ),
        )
        .subcommand(
            Command::new("test-email")
                .about("Send a test message with the stored SMTP credentials")
                .arg(Arg::new("to").long("to").required(true).help("Recipient address")),
        )
}

fn read_event<T: DeserializeOwned>(matches: &ArgMatches) -> Result<T, Box<dyn Error>> {
    let path = matches.get_one::<String>("event").map(String::as_str);
    let raw = read_event_source(path)?;
    Ok(serde_json::from_str(&raw)?)
}

fn write_response<T: Serialize>(response: &T) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(response)?);
    Ok(())
}

fn run(matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    match matches.subcommand() {
        Some(("define", sub_matches)) => {
            let config = MagicLinkConfig::from_env()?;
            let request: DefineChallengeRequest = read_event(sub_matches)?;
            let decision = ChallengeOrchestrator::from_config(&config).decide(&request.into());
            write_response(&DefineChallengeResponse::from(decision))
        }
        Some(("create", sub_matches)) => {
            let config = MagicLinkConfig::from_env()?;
            let request: CreateChallengeRequest = read_event(sub_matches)?;

            let notifier: Box<dyn Notifier> = if sub_matches.get_flag("dry-run") {
                Box::new(ConsoleNotifier)
            } else {
                Box::new(SmtpNotifier::from_keyring(&config.sender_address)?)
            };

            let issued = ChallengeIssuer::new(&config, &*notifier)
                .issue(request.email.as_deref())?;
            write_response(&CreateChallengeResponse::from(issued))
        }
        Some(("verify", sub_matches)) => {
            let config = MagicLinkConfig::from_env()?;
            let request: VerifyChallengeRequest = read_event(sub_matches)?;
            let answer_correct = ChallengeVerifier::new(&config)
                .verify(&request.private_params, request.answer.as_deref());
            write_response(&VerifyChallengeResponse { answer_correct })
        }
        Some(("init-key", _)) => {
            let signing_key = SecureSigningKey::new()?;
            if signing_key.initialize_if_needed()? {
                println!("New signing key generated and stored in system keyring");
            } else {
                println!("A signing key is already stored in the system keyring");
            }
            Ok(())
        }
        Some(("setup-smtp", sub_matches)) => {
            let host = sub_matches
                .get_one::<String>("host")
                .ok_or("missing --host")?;
            let port = *sub_matches.get_one::<u16>("port").ok_or("missing --port")?;
            let username = sub_matches
                .get_one::<String>("username")
                .ok_or("missing --username")?;
            setup_smtp_credentials(host, port, username)?;
            Ok(())
        }
        Some(("test-email", sub_matches)) => {
            let config = MagicLinkConfig::from_env()?;
            let to = sub_matches.get_one::<String>("to").ok_or("missing --to")?;
            test_email_configuration(&config, to)?;
            Ok(())
        }
        _ => {
            cli().print_help()?;
            Ok(())
        }
    }
}

fn main() {
    if let Err(e) = initialize_logging(LOG_FILE) {
        eprintln!("Warning: failed to initialize logging: {}", e);
    }

    let matches = cli().get_matches();
    if let Err(e) = run(&matches) {
        error!("Command failed: {}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        cli().debug_assert();
    }

    #[test]
    fn test_create_dry_run_flag() {
        let matches = cli()
            .try_get_matches_from(["magic-link-auth", "create", "--dry-run", "--event", "e.json"])
            .unwrap();
        let (name, sub_matches) = matches.subcommand().unwrap();
        assert_eq!(name, "create");
        assert!(sub_matches.get_flag("dry-run"));
        assert_eq!(
            sub_matches.get_one::<String>("event").map(String::as_str),
            Some("e.json")
        );
    }

    #[test]
    fn test_setup_smtp_default_port() {
        let matches = cli()
            .try_get_matches_from([
                "magic-link-auth",
                "setup-smtp",
                "--host",
                "smtp.example.com",
                "--username",
                "mailer@example.com",
            ])
            .unwrap();
        let (_, sub_matches) = matches.subcommand().unwrap();
        assert_eq!(sub_matches.get_one::<u16>("port"), Some(&587));
    }
}
