//! Walk through the DID claims flow from the command line: connect a wallet,
//! derive a DID from a passphrase, sign up to three claims, decode tokens.

mod config;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use did_claims::{
    crypto::did::DidParser, derive_seed, Claim, ClaimForm, Did, Session, VerifyOptions,
    MAX_CLAIMS,
};
use did_claims_key_support::LocalWallet;
use dotenv::dotenv;
use log::info;

use crate::config::Config;

#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    #[command(flatten)]
    config: Config,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the seed digest of the given inputs, hashed in order
    Seed {
        #[arg(required = true)]
        inputs: Vec<String>,
    },
    /// Derive a DID from the wallet's signature over the passphrase digest
    Derive {
        #[arg(long, env = "DID_CLAIMS_PASSPHRASE", hide_env_values = true)]
        passphrase: String,
    },
    /// Derive a DID and sign up to three claims with it
    Sign {
        #[arg(long, env = "DID_CLAIMS_PASSPHRASE", hide_env_values = true)]
        passphrase: String,

        /// A claim as KEY=VALUE; may be repeated
        #[arg(long = "claim", value_parser = parse_claim)]
        claims: Vec<Claim>,
    },
    /// Verify a compact token and print its issuer and payload
    Decode {
        token: String,

        /// Fail unless the token was issued by this DID
        #[arg(long)]
        issuer: Option<String>,
    },
    /// Print the resolved configuration
    Config,
}

fn parse_claim(claim: &str) -> Result<Claim, String> {
    claim
        .split_once('=')
        .map(|(key, value)| Claim::new(key, value))
        .ok_or_else(|| format!("Expected KEY=VALUE, got {claim:?}"))
}

async fn derived_session(config: &Config, passphrase: &str) -> Result<Session<LocalWallet>> {
    let mut session = Session::new(config.wallet()?, config.session());

    let connection = session.connect().await?;
    info!("Wallet {} on chain {}", connection.address, connection.chain_id);
    println!("address: {}", connection.address);

    let did = session
        .derive_did(passphrase)
        .await
        .context("Could not derive a DID")?;
    println!("did:     {}", did.id()?);

    Ok(session)
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Seed { inputs } => {
            println!("{}", derive_seed(&inputs));
        }
        Command::Derive { passphrase } => {
            derived_session(&cli.config, &passphrase).await?;
        }
        Command::Sign { passphrase, claims } => {
            let form = ClaimForm::try_from(claims).map_err(|claims| {
                anyhow!(
                    "At most {MAX_CLAIMS} claims can be signed, got {}",
                    claims.len()
                )
            })?;
            if form.claims().is_empty() {
                info!("Signing an empty claims object");
            }

            let mut session = derived_session(&cli.config, &passphrase).await?;
            let token = session
                .sign_claims(&form)
                .await
                .context("Could not sign the claims")?;
            println!("token:   {token}");
        }
        Command::Decode { token, issuer } => {
            let verifier = Did::new(DidParser::default());
            let verified = verifier
                .verify_jws_with(&token, &VerifyOptions { issuer })
                .await
                .context("Could not decode the token")?;

            println!("issuer:  {}", verified.issuer);
            println!("payload: {}", serde_json::to_string_pretty(&verified.payload)?);
        }
        Command::Config => {
            match cli.config.read_endpoint() {
                Some(url) => println!("rpc url:      {url}"),
                None => println!("rpc url:      (none)"),
            }
            println!(
                "wallet key:   {}",
                if cli.config.wallet_key.is_some() { "set" } else { "ephemeral" }
            );
            println!("bind address: {}", cli.config.bind_address);
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    env_logger::init();

    run(Cli::parse()).await
}

#[cfg(test)]
mod tests {
    use super::{parse_claim, Cli, Command};
    use clap::Parser;
    use did_claims::Claim;

    #[test]
    fn it_parses_claims_as_key_value_pairs() {
        assert_eq!(parse_claim("name=alice").unwrap(), Claim::new("name", "alice"));
        assert_eq!(parse_claim("note=a=b").unwrap(), Claim::new("note", "a=b"));
        assert_eq!(parse_claim("empty=").unwrap(), Claim::new("empty", ""));
        assert!(parse_claim("no-separator").is_err());
    }

    #[test]
    fn it_collects_repeated_claims() {
        let cli = Cli::try_parse_from([
            "did-claims",
            "sign",
            "--passphrase",
            "pass",
            "--claim",
            "a=1",
            "--claim",
            "b=2",
        ])
        .unwrap();

        match cli.command {
            Command::Sign { claims, .. } => {
                assert_eq!(claims, vec![Claim::new("a", "1"), Claim::new("b", "2")])
            }
            other => panic!("Unexpected command {other:?}"),
        }
    }

    #[test]
    fn it_parses_the_rpc_url() {
        let cli = Cli::try_parse_from([
            "did-claims",
            "config",
            "--rpc-url",
            "https://api.node.glif.io/rpc/v1",
        ])
        .unwrap();

        assert_eq!(
            cli.config.rpc_url.unwrap().host_str(),
            Some("api.node.glif.io")
        );
        assert!(Cli::try_parse_from(["did-claims", "config", "--rpc-url", "not a url"]).is_err());
    }

    #[test]
    fn it_reads_the_rpc_url_from_the_environment() {
        std::env::set_var("ETH_RPC_URL", "https://rpc.ankr.com/eth");

        let cli = Cli::try_parse_from(["did-claims", "config"]).unwrap();

        assert_eq!(
            cli.config.read_endpoint().and_then(|url| url.host_str()),
            Some("rpc.ankr.com")
        );
    }
}
