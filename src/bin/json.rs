use std::{
    env, error, fs,
    io::{self, Read},
};
use wtg::{Decoder, TriggerData};

/// Reads a trigger file from stdin and prints it as json. The first argument
/// names the TriggerData.txt to resolve function parameters with.
fn main() -> Result<(), Box<dyn error::Error>> {
    env_logger::init();

    let trigger_data = match env::args_os().nth(1) {
        Some(path) => TriggerData::from_text(&fs::read(path)?)?,
        None => TriggerData::new(),
    };

    let mut data = Vec::new();
    io::stdin().read_to_end(&mut data)?;

    let doc = Decoder::new().decode(&data, &trigger_data)?;
    let stdout = io::stdout();
    serde_json::to_writer_pretty(stdout.lock(), &doc)?;
    println!();
    Ok(())
}
