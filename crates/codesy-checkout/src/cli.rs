use clap::{Args, Parser, Subcommand};
use std::process::ExitCode;

use codesy_checkout::{
    CheckoutConfig, CheckoutHandler, PageElement, SitePage, SubmitOutcome, SubmitResult,
};
use codesy_core::{format_usd, incremental_offer, parse_usd_cents, OfferCharge, PayoutBreakdown};

#[derive(Args, Debug, Clone)]
pub struct PayArgs {
    /// Card number.
    #[arg(long)]
    number: String,
    /// Expiry month.
    #[arg(long)]
    exp_month: String,
    /// Expiry year.
    #[arg(long)]
    exp_year: String,
    /// Security code.
    #[arg(long)]
    cvc: String,
    /// Stripe publishable key (overrides configuration).
    #[arg(long)]
    stripe_key: Option<String>,
    /// User id (overrides `CODESY_USER_ID`).
    #[arg(long)]
    user_id: Option<String>,
    /// CSRF token (overrides `CODESY_CSRF_TOKEN`).
    #[arg(long)]
    csrf_token: Option<String>,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Quote {
    /// What a bidder's card is charged for an offer.
    Offer {
        /// New offer total in dollars.
        #[arg(long)]
        amount: String,
        /// Dollars already charged for earlier offers on the same bid.
        #[arg(long, default_value = "0")]
        already_paid: String,
    },
    /// What a claimant receives for a payout.
    Payout {
        /// The claimant's ask in dollars.
        #[arg(long)]
        amount: String,
        /// The claimant's offers refunded with the payout, in dollars.
        #[arg(long, default_value = "0")]
        refund: String,
    },
}

#[derive(Subcommand, Clone, Debug)]
pub enum Action {
    /// Tokenize a card and store the token on the codesy user.
    Pay(PayArgs),
    /// Show fee breakdowns.
    #[command(subcommand)]
    Quote(Quote),
}

/// codesy checkout from the command line.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct AppArgs {
    #[command(subcommand)]
    pub action: Action,
}

impl AppArgs {
    pub async fn run(&self) -> Result<ExitCode, Box<dyn std::error::Error>> {
        match &self.action {
            Action::Pay(args) => pay(args).await,
            Action::Quote(quote) => {
                print_quote(quote)?;
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

async fn pay(args: &PayArgs) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let mut config = CheckoutConfig::from_env();
    if args.stripe_key.is_some() {
        config.stripe_publishable_key.clone_from(&args.stripe_key);
    }
    if args.user_id.is_some() {
        config.user_id.clone_from(&args.user_id);
    }
    if args.csrf_token.is_some() {
        config.csrf_token.clone_from(&args.csrf_token);
    }

    tracing::info!(
        site_url = %config.site_url,
        stripe_configured = %config.stripe_publishable_key.is_some(),
        user_configured = %config.user_id.is_some(),
        "Checkout configuration loaded"
    );

    let page = SitePage::new(&config)?
        .with(PageElement::CardNumber, args.number.as_str())
        .with(PageElement::ExpMonth, args.exp_month.as_str())
        .with(PageElement::ExpYear, args.exp_year.as_str())
        .with(PageElement::Cvc, args.cvc.as_str());

    let handler = CheckoutHandler::load(&page, &config.site_url, &config.client_options())?
        .guard_double_submit(config.guard_double_submit);

    let outcome = handler.submit(&page).await;
    Ok(report(&outcome))
}

fn report(outcome: &SubmitOutcome) -> ExitCode {
    let path: Vec<&str> = outcome.path.states().iter().map(|s| s.as_str()).collect();
    println!("submission {}: {}", outcome.submission_id, path.join(" -> "));

    match &outcome.result {
        SubmitResult::Updated { token_id } => {
            println!("card saved ({token_id})");
            ExitCode::SUCCESS
        }
        SubmitResult::TokenizeFailed(err) => {
            println!("card rejected: {}", err.message);
            ExitCode::FAILURE
        }
        SubmitResult::UpdateFailed { token_id, error } => {
            println!("token {token_id} issued but not saved: {error}");
            ExitCode::FAILURE
        }
        SubmitResult::UpdateSkipped { token_id } => {
            println!("token {token_id} issued but no user to save it on");
            ExitCode::FAILURE
        }
        SubmitResult::Ignored => {
            println!("ignored: a submission is already in flight");
            ExitCode::FAILURE
        }
    }
}

fn print_quote(quote: &Quote) -> Result<(), codesy_core::CoreError> {
    match quote {
        Quote::Offer {
            amount,
            already_paid,
        } => {
            let total = parse_usd_cents(amount)?;
            let paid = parse_usd_cents(already_paid)?;
            let Some(offer) = incremental_offer(total, paid) else {
                println!(
                    "nothing to charge: {} already covers {}",
                    format_usd(paid),
                    format_usd(total)
                );
                return Ok(());
            };
            let charge = OfferCharge::for_offer(offer)?;
            println!("offer        {:>10}", format_usd(charge.offer_cents));
            println!("codesy fee   {:>10}", format_usd(charge.codesy_fee_cents));
            println!("stripe fee   {:>10}", format_usd(charge.stripe_fee_cents));
            println!("charge       {:>10}", format_usd(charge.charge_cents()));
        }
        Quote::Payout { amount, refund } => {
            let payout =
                PayoutBreakdown::for_claim(parse_usd_cents(amount)?, parse_usd_cents(refund)?)?;
            println!("ask          {:>10}", format_usd(payout.ask_cents));
            println!("refund       {:>10}", format_usd(payout.refund_cents));
            println!("paypal fee   {:>10}", format_usd(payout.paypal_fee_cents));
            println!("codesy fee   {:>10}", format_usd(payout.codesy_fee_cents));
            println!("payout       {:>10}", format_usd(payout.net_cents()));
        }
    }
    Ok(())
}
