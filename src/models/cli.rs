use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "opendebates-client", about = "usage of opendebates-client commands.")]
pub enum Command {
    /// submit the vote dialog for an idea
    #[structopt(name = "vote")]
    Vote {
        /// vote URL of the idea (its data-vote-url)
        #[structopt(long)]
        url: String,
        /// voter email
        #[structopt(long)]
        email: String,
        /// voter zip code
        #[structopt(long)]
        zipcode: String,
        /// captcha response token
        #[structopt(long)]
        captcha_token: Option<String>,
    },
    /// open the vote dialog, voting straight away for a known voter
    #[structopt(name = "open")]
    Open {
        /// vote URL of the idea (its data-vote-url)
        #[structopt(long)]
        url: String,
    },
    /// keep the recent activity fragment fresh
    #[structopt(name = "poll")]
    Poll {
        /// stop after this many fetches
        #[structopt(long)]
        cycles: Option<u32>,
    },
    /// show the time left until the debate
    #[structopt(name = "countdown")]
    Countdown {
        /// refresh every minute until the debate starts
        #[structopt(long)]
        watch: bool,
    },
    /// list ideas already voted for
    #[structopt(name = "votes-cast")]
    VotesCast,
}
