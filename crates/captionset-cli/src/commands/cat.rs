use std::io::{BufRead, Write};

use captionset::WordVocab;

use crate::{
    input_output::{InputArgs, OutputArgs},
    vocab_args::VocabArgs,
};

/// The conversion direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatMode {
    Encode,
    Decode,
}

/// Mode selection for the cat command.
#[derive(clap::Args, Debug)]
#[group(required = true, multiple = false)]
pub struct CatModeArgs {
    /// Convert whitespace-separated tokens to indices.
    #[arg(long, action=clap::ArgAction::SetTrue)]
    encode: bool,

    /// Convert whitespace-separated indices to tokens.
    #[arg(long, action=clap::ArgAction::SetTrue)]
    decode: bool,
}

impl CatModeArgs {
    /// Get the conversion mode.
    pub fn mode(&self) -> CatMode {
        if self.decode {
            CatMode::Decode
        } else {
            CatMode::Encode
        }
    }
}

/// Args for the cat command.
#[derive(clap::Args, Debug)]
pub struct CatArgs {
    #[command(flatten)]
    vocab: VocabArgs,

    #[command(flatten)]
    mode: CatModeArgs,

    #[command(flatten)]
    input: InputArgs,

    #[command(flatten)]
    output: OutputArgs,
}

impl CatArgs {
    /// Run the cat command.
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        let vocab = self.vocab.load_vocab()?;

        let mut reader = self.input.open_reader()?;
        let mut writer = self.output.open_writer()?;

        run_cat(&mut reader, &mut writer, &vocab, self.mode.mode())
    }
}

/// Convert each input line; one output line per input line.
fn run_cat(
    reader: &mut dyn BufRead,
    writer: &mut dyn Write,
    vocab: &WordVocab,
    mode: CatMode,
) -> Result<(), Box<dyn std::error::Error>> {
    for line in reader.lines() {
        let line = line?;
        let fields = line.split_whitespace().collect::<Vec<_>>();

        let out = match mode {
            CatMode::Encode => vocab
                .token_to_index(&fields)?
                .iter()
                .map(|idx| idx.to_string())
                .collect::<Vec<_>>(),
            CatMode::Decode => {
                let indices = fields
                    .iter()
                    .map(|s| s.parse::<usize>())
                    .collect::<Result<Vec<_>, _>>()?;
                vocab
                    .index_to_token(&indices)?
                    .into_iter()
                    .map(str::to_string)
                    .collect()
            }
        };

        writeln!(writer, "{}", out.join(" "))?;
        writer.flush()?;
    }
    Ok(())
}
