// config.rs - KEY=VALUE configuration file, overridden by process environment

use anyhow::{anyhow, bail, Context, Result};
use std::collections::HashMap;
use std::path::Path;

use mazegen::{MazeParams, Point};

const KEYS: [&str; 9] = [
    "WIDTH",
    "HEIGHT",
    "ENTRY",
    "EXIT",
    "OUTPUT_FILE",
    "PERFECT",
    "SEED",
    "INSERT_42",
    "PROBABILITY_TO_DEL_DEAD_END",
];

/// Values from the file plus any environment variables with the same names.
/// Environment wins, like a dotenv load that does not override.
#[derive(Debug, Clone, Default)]
pub struct Config {
    file: HashMap<String, String>,
    env: HashMap<String, String>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Config file \"{}\" is required but could not be read", path.display()))?;
        let config = Self::parse(&text)
            .with_context(|| format!("Can't read config file \"{}\"", path.display()))?;
        let vars = std::env::vars_os().filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)));
        Ok(config.with_env(vars))
    }

    pub fn parse(text: &str) -> Result<Self> {
        let mut file = HashMap::new();
        for (n, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let line = line.strip_prefix("export ").unwrap_or(line);
            let (key, value) = line
                .split_once('=')
                .ok_or_else(|| anyhow!("line {}: expected KEY=VALUE, got '{}'", n + 1, line))?;
            file.insert(key.trim().to_string(), unquote(value.trim()).to_string());
        }
        Ok(Self {
            file,
            env: HashMap::new(),
        })
    }

    /// Keep the known keys from `vars` as overrides
    pub fn with_env<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .filter(|(k, _)| KEYS.contains(&k.as_str()))
            .collect();
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.env.get(key).or_else(|| self.file.get(key)).map(String::as_str)
    }

    fn required(&self, key: &str) -> Result<&str> {
        match self.get(key) {
            Some(v) if !v.is_empty() => Ok(v),
            Some(_) => bail!("The {key} parameter is empty, check the config file"),
            None => bail!("The {key} parameter is not set, check the config file"),
        }
    }

    /// Build maze parameters. `WIDTH`, `HEIGHT`, `ENTRY`, `EXIT`, `OUTPUT_FILE` and
    /// `PERFECT` are required. Range checks are left to [`MazeParams::validate`].
    pub fn to_params(&self) -> Result<MazeParams> {
        let width = parse_number(self.required("WIDTH")?, "WIDTH")?;
        let height = parse_number(self.required("HEIGHT")?, "HEIGHT")?;
        let entry = parse_point(self.required("ENTRY")?, "ENTRY")?;
        let exit = parse_point(self.required("EXIT")?, "EXIT")?;
        let perfect = parse_bool(self.required("PERFECT")?, "PERFECT")?;

        let mut params = MazeParams::new(width, height, entry, exit)
            .perfect(perfect)
            .with_output_file(self.required("OUTPUT_FILE")?)
            .with_pattern(self.get("INSERT_42") != Some("False"));

        if let Some(seed) = self.get("SEED").filter(|s| !s.is_empty()) {
            params = params.with_seed(parse_number(seed, "SEED")?);
        }
        if let Some(p) = self.get("PROBABILITY_TO_DEL_DEAD_END").filter(|s| !s.is_empty()) {
            params = params.with_dead_end_probability(parse_number(p, "PROBABILITY_TO_DEL_DEAD_END")?);
        }
        Ok(params)
    }
}

/// Strip surrounding quotes and any trailing ` #` comment. Inside quotes `#` is literal.
fn unquote(value: &str) -> &str {
    for q in ['"', '\''] {
        if let Some((inner, rest)) = value.strip_prefix(q).and_then(|v| v.split_once(q)) {
            let rest = rest.trim_start();
            if rest.is_empty() || rest.starts_with('#') {
                return inner;
            }
        }
    }
    match value.find(" #") {
        Some(i) => value[..i].trim_end(),
        None => value,
    }
}

fn parse_number<T: std::str::FromStr>(value: &str, key: &str) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .trim()
        .parse()
        .with_context(|| format!("Wrong value of parameter {key}={value}"))
}

fn parse_point(value: &str, key: &str) -> Result<Point> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| anyhow!("Wrong value of parameter {key}={value}, expected x,y"))?;
    Ok(Point::new(parse_number(x, key)?, parse_number(y, key)?))
}

fn parse_bool(value: &str, key: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => bail!("Wrong value of parameter {key}={value}, expected True or False"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const SAMPLE: &str = r#"
# maze settings
WIDTH=20
HEIGHT=15
ENTRY=0,0
EXIT="19,14"
OUTPUT_FILE="maze #1.txt"   # written next to the binary
PERFECT='True' # quoted
SEED=42 # fixed
"#;

    #[test]
    fn test_parse_sample() {
        let params = Config::parse(SAMPLE).unwrap().to_params().unwrap();
        assert_eq!((params.width, params.height), (20, 15));
        assert_eq!(params.entry, Point::new(0, 0));
        assert_eq!(params.exit, Point::new(19, 14));
        assert_eq!(params.output_file, Some(PathBuf::from("maze #1.txt")));
        assert!(params.perfect);
        assert!(params.insert_pattern);
        assert_eq!(params.seed, Some(42));
        assert_eq!(params.dead_end_probability, mazegen::DEFAULT_DEAD_END_PROBABILITY);
    }

    #[test]
    fn test_environment_takes_precedence() {
        let config = Config::parse(SAMPLE)
            .unwrap()
            .with_env([("SEED", "7"), ("PERFECT", "False"), ("HOME", "/root")]);
        let params = config.to_params().unwrap();
        assert_eq!(params.seed, Some(7));
        assert!(!params.perfect);
        assert_eq!(config.get("HOME"), None);
    }

    #[test]
    fn test_insert_42_only_disabled_by_false() {
        let with = |v: &str| {
            Config::parse(&format!("{SAMPLE}INSERT_42={v}\n"))
                .unwrap()
                .to_params()
                .unwrap()
                .insert_pattern
        };
        assert!(!with("False"));
        assert!(with("True"));
        assert!(with("false"));
    }

    #[test]
    fn test_missing_required_key() {
        let err = Config::parse("WIDTH=3\nHEIGHT=3\n").unwrap().to_params().unwrap_err();
        assert!(err.to_string().contains("ENTRY"));
    }

    #[test]
    fn test_bad_values_are_named() {
        let err = Config::parse(&SAMPLE.replace("ENTRY=0,0", "ENTRY=0;0"))
            .unwrap()
            .to_params()
            .unwrap_err();
        assert!(err.to_string().contains("ENTRY=0;0"));

        let err = Config::parse(&SAMPLE.replace("PERFECT='True'", "PERFECT=maybe"))
            .unwrap()
            .to_params()
            .unwrap_err();
        assert!(err.to_string().contains("PERFECT"));
    }

    #[test]
    fn test_quotes_and_comments() {
        assert_eq!(unquote(r#""value" # comment"#), "value");
        assert_eq!(unquote("'a # b'"), "a # b");
        assert_eq!(unquote("plain # comment"), "plain");
        assert_eq!(unquote("a#b"), "a#b");
        assert_eq!(unquote(r#""open"#), r#""open"#);
    }

    #[test]
    fn test_line_without_equals_is_rejected() {
        assert!(Config::parse("WIDTH 20\n").is_err());
    }
}
