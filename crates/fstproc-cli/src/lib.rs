//! fstproc-cli — argument parsing and stream wiring for the `fstproc`
//! binary. `main.rs` only initialises logging and delegates to
//! [`run`].

#![deny(missing_docs)]

use std::fs::File;
use std::io::{Read, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;

use fstproc_container::Bundle;
use fstproc_engine::{CasePolicy, EngineOptions, GenerationSubmode, Mode, Processor};

/// `fstproc` — process a text stream with a compiled finite-state
/// transducer bundle.
///
/// Mode and case-policy flags mirror the original `lt-proc` front end: at
/// most one mode flag may be given (`-g -b` together is the one allowed
/// exception, forcing bilingual mode), and generation sub-flags (`-d`,
/// `-l`, `-m`, `-n`, `-C`) implicitly select generation mode if no other
/// mode flag is given. `-h`/`-v` are handled before argument parsing even
/// runs (see `main.rs`), since clap's built-in help/version actions always
/// exit 0 and this front end needs `-h` to exit 1.
#[derive(Debug, Parser)]
#[command(
    name = "fstproc",
    about = "Process a stream with a letter transducer",
    long_about = None,
    disable_version_flag = true,
    disable_help_flag = true
)]
pub struct Cli {
    /// Morphological analysis (default behaviour).
    #[arg(short = 'a', long = "analysis")]
    pub analysis: bool,
    /// Lexical transfer.
    #[arg(short = 'b', long = "bilingual")]
    pub bilingual: bool,
    /// Lexical transfer, keeping the surface form on the left-hand side.
    #[arg(short = 'o', long = "surf-bilingual")]
    pub surf_bilingual: bool,
    /// Morphological generation.
    #[arg(short = 'g', long = "generation")]
    pub generation: bool,
    /// Generation, keeping the full debugging form on failure.
    #[arg(short = 'd', long = "debugged-gen")]
    pub debugged_gen: bool,
    /// Generation, keeping lexical forms on failure.
    #[arg(short = 'l', long = "tagged-gen")]
    pub tagged_gen: bool,
    /// Like `-l`, without unknown-word marks.
    #[arg(short = 'm', long = "tagged-nm-gen")]
    pub tagged_nm_gen: bool,
    /// Generation without unknown-word marks.
    #[arg(short = 'n', long = "non-marked-gen")]
    pub non_marked_gen: bool,
    /// Post-generation.
    #[arg(short = 'p', long = "post-generation")]
    pub post_generation: bool,
    /// Inter-generation.
    #[arg(short = 'x', long = "inter-generation")]
    pub inter_generation: bool,
    /// SAO annotation system input processing.
    #[arg(short = 's', long = "sao")]
    pub sao: bool,
    /// Apply a transliteration dictionary.
    #[arg(short = 't', long = "transliteration")]
    pub transliteration: bool,
    /// Try to decompose unknown words as compounds.
    #[arg(short = 'e', long = "decompose-nouns")]
    pub decompose_nouns: bool,

    /// Use the literal case of the incoming characters.
    #[arg(short = 'c', long = "case-sensitive")]
    pub case_sensitive: bool,
    /// Use dictionary case instead of surface case.
    #[arg(short = 'w', long = "dictionary-case")]
    pub dictionary_case: bool,
    /// Use dictionary case if present, else surface case.
    #[arg(short = 'C', long = "careful-case")]
    pub careful_case: bool,

    /// File with characters to ignore, one per line.
    #[arg(short = 'i', long = "ignored-chars")]
    pub ignored_chars: Option<PathBuf>,
    /// File with `surface matching-form` character pairs for diacritic
    /// restoration, one pair per line.
    #[arg(short = 'r', long = "restore-chars")]
    pub restore_chars: Option<PathBuf>,
    /// Skip loading the built-in default ignore characters.
    #[arg(short = 'I', long = "no-default-ignore")]
    pub no_default_ignore: bool,

    /// Flush output on the null character.
    #[arg(short = 'z', long = "null-flush")]
    pub null_flush: bool,
    /// Print final analysis weights, if any.
    #[arg(short = 'W', long = "show-weights")]
    pub show_weights: bool,
    /// Output no more than N analyses.
    #[arg(short = 'N', long = "analyses")]
    pub max_analyses: Option<usize>,
    /// Output no more than N weight classes.
    #[arg(short = 'L', long = "weight-classes")]
    pub max_weight_classes: Option<usize>,

    /// Compiled transducer bundle.
    pub fst_file: PathBuf,
    /// Input file, or stdin if omitted.
    pub input_file: Option<PathBuf>,
    /// Output file, or stdout if omitted.
    pub output_file: Option<PathBuf>,
}

/// Rejects conflicting mode flags with a usage error (exit 1), matching
/// `lt_proc.cc`'s single-assignment `cmd` variable: once one mode flag is
/// set, a second one is an error, except `-g -b` together, which is
/// explicitly allowed and resolves to bilingual mode.
fn validate_mode_flags(cli: &Cli) -> Result<()> {
    let primary: [(&str, bool); 9] = [
        ("-a", cli.analysis),
        ("-b", cli.bilingual),
        ("-o", cli.surf_bilingual),
        ("-g", cli.generation),
        ("-p", cli.post_generation),
        ("-x", cli.inter_generation),
        ("-t", cli.transliteration),
        ("-s", cli.sao),
        ("-e", cli.decompose_nouns),
    ];
    let set: Vec<&str> = primary.iter().filter(|(_, on)| *on).map(|(name, _)| *name).collect();
    let is_generation_bilingual_pair = set.len() == 2 && set.contains(&"-g") && set.contains(&"-b");
    if set.len() > 1 && !is_generation_bilingual_pair {
        bail!("conflicting mode flags: {}", set.join(" "));
    }
    Ok(())
}

/// Resolves the mode the flags request, assuming [`validate_mode_flags`]
/// already rejected any conflicting combination (so at most one primary
/// mode flag is set here, barring the allowed `-g -b` pair).
fn resolve_mode(cli: &Cli) -> Mode {
    if cli.decompose_nouns {
        return Mode::Decomposition;
    }
    if cli.bilingual || cli.surf_bilingual {
        return Mode::Bilingual { keep_surface: cli.surf_bilingual };
    }
    if cli.post_generation {
        return Mode::PostGeneration;
    }
    if cli.inter_generation {
        return Mode::InterGeneration;
    }
    if cli.sao {
        return Mode::Sao;
    }
    if cli.transliteration {
        return Mode::Transliteration;
    }
    if cli.analysis {
        return Mode::Analysis;
    }
    if cli.generation || cli.debugged_gen || cli.tagged_gen || cli.tagged_nm_gen || cli.non_marked_gen || cli.careful_case
    {
        let submode = if cli.debugged_gen {
            GenerationSubmode::All
        } else if cli.tagged_nm_gen {
            GenerationSubmode::TaggedNm
        } else if cli.tagged_gen {
            GenerationSubmode::Tagged
        } else if cli.non_marked_gen {
            GenerationSubmode::Clean
        } else if cli.careful_case {
            GenerationSubmode::CarefulCase
        } else {
            GenerationSubmode::Unknown
        };
        return Mode::Generation(submode);
    }
    Mode::Analysis
}

/// Rejects `-N 0` / `-L 0` with a usage error (exit 1), matching
/// `lt_proc.cc`'s `atoi(optarg) < 1` check.
fn validate_pruning_counts(cli: &Cli) -> Result<()> {
    if cli.max_analyses == Some(0) {
        bail!("-N requires a value of at least 1");
    }
    if cli.max_weight_classes == Some(0) {
        bail!("-L requires a value of at least 1");
    }
    Ok(())
}

fn resolve_case_policy(cli: &Cli) -> CasePolicy {
    if cli.case_sensitive {
        CasePolicy::CaseSensitive
    } else if cli.careful_case {
        CasePolicy::CarefulCase
    } else if cli.dictionary_case {
        CasePolicy::DictionaryCase
    } else {
        CasePolicy::Default
    }
}

fn load_ignored_chars(path: &PathBuf) -> Result<Vec<char>> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading ignore file {}", path.display()))?;
    Ok(text.lines().filter_map(|line| line.chars().next()).collect())
}

fn load_restore_chars(path: &PathBuf) -> Result<Vec<(char, char)>> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading restore file {}", path.display()))?;
    let mut pairs = Vec::new();
    for line in text.lines() {
        let mut fields = line.split_whitespace();
        if let (Some(from), Some(to)) =
            (fields.next().and_then(|s| s.chars().next()), fields.next().and_then(|s| s.chars().next()))
        {
            pairs.push((from, to));
        }
    }
    Ok(pairs)
}

fn build_options(cli: &Cli) -> Result<EngineOptions> {
    let mut options = if cli.no_default_ignore {
        EngineOptions { char_classes: fstproc_engine::CharClasses::default(), ..EngineOptions::default() }
    } else {
        EngineOptions::default()
    };
    options.case_policy = resolve_case_policy(cli);
    options.show_weights = cli.show_weights;
    options.max_analyses = cli.max_analyses;
    options.max_weight_classes = cli.max_weight_classes;
    options.null_flush = cli.null_flush;

    if let Some(path) = &cli.ignored_chars {
        options.char_classes.ignorable.extend(load_ignored_chars(path)?);
    }
    if let Some(path) = &cli.restore_chars {
        options.char_classes.restore.extend(load_restore_chars(path)?);
    }
    Ok(options)
}

/// Loads the bundle, resolves mode/options from `cli`, streams the input
/// through the processor, and writes the result to the requested output.
pub fn run(cli: &Cli) -> Result<()> {
    validate_mode_flags(cli)?;
    validate_pruning_counts(cli)?;

    let mut fst_bytes = Vec::new();
    File::open(&cli.fst_file)
        .with_context(|| format!("opening transducer bundle {}", cli.fst_file.display()))?
        .read_to_end(&mut fst_bytes)?;
    let bundle = Bundle::load(&mut fst_bytes.as_slice()).context("loading transducer bundle")?;

    let Some((name, transducer)) = bundle.transducers.first() else {
        bail!("bundle {} contains no transducers", cli.fst_file.display());
    };
    #[cfg(feature = "trace")]
    log::info!("loaded transducer {name:?} with {} states", transducer.num_states());
    #[cfg(not(feature = "trace"))]
    let _ = name;

    let mode = resolve_mode(cli);
    let options = build_options(cli)?;
    let processor = Processor::new(&bundle.alphabet, transducer, mode, options);

    let input = match &cli.input_file {
        Some(path) => std::fs::read_to_string(path).with_context(|| format!("reading input {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let output = processor.process_stream(&input);

    match &cli.output_file {
        Some(path) => std::fs::write(path, output).with_context(|| format!("writing output {}", path.display()))?,
        None => std::io::stdout().write_all(output.as_bytes())?,
    }
    Ok(())
}
