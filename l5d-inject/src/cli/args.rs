use std::ffi::OsString;

/// Flags whose value may come as the next argument.
const VALUE_FLAGS: [&str; 7] =
    ["f", "o", "linkerdPort", "linkerdSvcName", "config", "log-level", "completions"];

/// Rewrites Go-style long flags (`-linkerdPort=4140`) into the GNU form
/// (`--linkerdPort=4140`) clap understands.
///
/// Single-character flags (`-f`, `-o`), arguments that already start with
/// `--`, a lone `-`, the value following a flag such as `-o` and everything
/// after `--` are left untouched. The first argument is the program name.
pub fn normalize<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut normalized = Vec::new();
    let mut flags_ended = false;
    let mut value_pending = false;
    for (position, arg) in args.into_iter().map(Into::into).enumerate() {
        if position == 0 || flags_ended || value_pending {
            value_pending = false;
            normalized.push(arg);
            continue;
        }
        value_pending = arg.to_str().is_some_and(takes_separate_value);
        if arg.to_str() == Some("--") {
            flags_ended = true;
            normalized.push(arg);
            continue;
        }
        match arg.to_str() {
            Some(flag) if is_single_dash_long_flag(flag) => {
                normalized.push(OsString::from(format!("-{flag}")));
            }
            _ => normalized.push(arg),
        }
    }
    normalized
}

fn takes_separate_value(arg: &str) -> bool {
    let name = arg.strip_prefix("--").or_else(|| arg.strip_prefix('-'));
    name.is_some_and(|name| VALUE_FLAGS.contains(&name))
}

fn is_single_dash_long_flag(arg: &str) -> bool {
    let Some(rest) = arg.strip_prefix('-') else {
        return false;
    };
    if rest.starts_with('-') {
        return false;
    }
    let name = rest.split_once('=').map_or(rest, |(name, _)| name);
    name.chars().count() > 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalize_strs(args: &[&str]) -> Vec<String> {
        normalize(args.iter().copied())
            .into_iter()
            .map(|arg| arg.into_string().unwrap())
            .collect()
    }

    #[test]
    fn test_long_flags_get_a_second_dash() {
        assert_eq!(
            normalize_strs(&[
                "l5d-inject",
                "-linkerdPort=9999",
                "-useServiceVip",
                "-linkerdSvcName",
                "mesh"
            ]),
            ["l5d-inject", "--linkerdPort=9999", "--useServiceVip", "--linkerdSvcName", "mesh"]
        );
    }

    #[test]
    fn test_short_flags_and_values_are_untouched() {
        assert_eq!(
            normalize_strs(&["l5d-inject", "-f", "-", "-o=out.yaml", "--log-level", "debug"]),
            ["l5d-inject", "-f", "-", "-o=out.yaml", "--log-level", "debug"]
        );
    }

    #[test]
    fn test_flag_values_starting_with_a_dash_are_untouched() {
        assert_eq!(
            normalize_strs(&[
                "l5d-inject",
                "-o",
                "-out.yaml",
                "-linkerdSvcName",
                "-mesh",
                "--config",
                "-inject.yaml",
                "-f",
                "-in.yaml"
            ]),
            [
                "l5d-inject",
                "-o",
                "-out.yaml",
                "--linkerdSvcName",
                "-mesh",
                "--config",
                "-inject.yaml",
                "-f",
                "-in.yaml"
            ]
        );
    }

    #[test]
    fn test_flag_after_equals_form_is_normalized() {
        assert_eq!(
            normalize_strs(&[
                "l5d-inject",
                "-o=out.yaml",
                "-useServiceVip",
                "-f=in.yaml",
                "-linkerdPort=1"
            ]),
            ["l5d-inject", "-o=out.yaml", "--useServiceVip", "-f=in.yaml", "--linkerdPort=1"]
        );
    }

    #[test]
    fn test_arguments_after_double_dash_are_untouched() {
        assert_eq!(
            normalize_strs(&["l5d-inject", "--", "-linkerdPort"]),
            ["l5d-inject", "--", "-linkerdPort"]
        );
    }

    #[test]
    fn test_program_name_is_untouched() {
        assert_eq!(normalize_strs(&["-weird-name"]), ["-weird-name"]);
    }
}
