use lazy_regex::regex;

/// Rewrites every run of three or more `$` to the standard convention.
///
/// Within a run, each six `$` become `$$` and each remaining three become `$`;
/// leftover `$` are kept. A run that would still be three or more long (e.g.
/// a closing `$$$` glued to an opening `$$$$$$`) is reduced again, so the
/// output never contains a run longer than two and normalizing twice equals
/// normalizing once.
pub fn normalize_delimiters(markup: &str) -> String {
    let run_re = regex!(r"\${3,}");
    run_re
        .replace_all(markup, |caps: &regex::Captures| "$".repeat(collapsed_len(caps[0].len())))
        .into_owned()
}

fn collapsed_len(mut len: usize) -> usize {
    while len >= 3 {
        len = (len / 6) * 2 + (len % 6) / 3 + len % 3;
    }
    len
}
