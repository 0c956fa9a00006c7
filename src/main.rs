use chrono::Utc;
use dotenvy::dotenv;
use env_logger::{Builder, Env};
use structopt::StructOpt;

use opendebates_client::{
    models::Command,
    utils::{Countdown, COUNTDOWN_REFRESH},
    ApiClient, ClientConfig, ConsoleView, DialogOutcome, RecentActivityPoller, VoteClient,
    VoteOutcome, VoterFields,
};

fn init_logger() {
    Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp(Some(env_logger::TimestampPrecision::Millis))
        .format_target(true)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = dotenv() {
        eprintln!("Warning: failed to load .env file: {}", e);
    }

    init_logger();

    let command = Command::from_args();
    let config = ClientConfig::from_env()?;
    let api = ApiClient::new(config.base_url.clone(), config.request_timeout)?;
    let mut view = ConsoleView;

    match command {
        Command::Vote {
            url,
            email,
            zipcode,
            captcha_token,
        } => {
            let mut fields = VoterFields::new(email, zipcode);
            fields.captcha_token = captcha_token;

            let client = VoteClient::new(api, config.page_context());
            if let VoteOutcome::Rejected(errors) =
                client.submit_dialog(&mut view, &url, fields).await?
            {
                anyhow::bail!("vote rejected ({} fields with errors)", errors.len());
            }
        }
        Command::Open { url } => {
            let client = VoteClient::new(api, config.page_context());
            match client.open_vote_dialog(&mut view, &url).await? {
                DialogOutcome::ShowDialog => {
                    println!("Vote dialog required: use `vote` with your email and zip code");
                }
                DialogOutcome::Voted(VoteOutcome::Rejected(errors)) => {
                    anyhow::bail!("vote rejected ({} fields with errors)", errors.len());
                }
                DialogOutcome::Voted(VoteOutcome::Counted(_)) => {}
            }
        }
        Command::Poll { cycles } => {
            let poller = RecentActivityPoller::new(api, config.poll_increment);
            match cycles {
                Some(cycles) => {
                    poller.run_for(&mut view, cycles).await;
                }
                None => poller.run(&mut view).await,
            }
        }
        Command::Countdown { watch } => {
            let mut ticker = tokio::time::interval(COUNTDOWN_REFRESH);
            loop {
                ticker.tick().await;
                let countdown = Countdown::until(config.countdown_target, Utc::now());
                println!("{}", countdown);
                if !watch || countdown.is_elapsed() {
                    break;
                }
            }
        }
        Command::VotesCast => {
            let client = VoteClient::new(api, config.page_context());
            if client.restore_votes_cast(&mut view) == 0 {
                println!("No votes cast yet");
            }
        }
    }

    Ok(())
}
