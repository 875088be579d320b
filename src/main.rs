use herdsim::herd::ContextHerdExt;
use herdsim::runner::run_with_args;

fn main() {
    let context = match run_with_args() {
        Ok(context) => context,
        Err(err) => {
            eprintln!("herdsim: {err}");
            std::process::exit(1);
        }
    };

    if let Some(metrics) = context.herd().and_then(|herd| herd.history().last()) {
        println!(
            "day {} ({}): {} alive, {} infected, {} vaccinated",
            metrics.day, metrics.date, metrics.alive, metrics.infected, metrics.vaccinated
        );
        println!(
            "removed: {} by age, {} by disease, {} by surveillance; virus located: {}",
            metrics.died_of_age,
            metrics.died_of_disease,
            metrics.removed_by_surveillance,
            metrics.virus_located
        );
    }
}
