use colored::{Color, ColoredString, Colorize};
use crossterm::terminal;

use crate::{
    config::RunConfig,
    testing::{JudgeCode, TestOutcome, TestSummary},
};

pub const DEFAULT_TRUNCATE_LINES: usize = 20;

pub fn is_truecolor_supported() -> bool {
    let Ok(v) = std::env::var("COLORTERM") else {
        return false
    };
    matches!(v.as_str(), "truecolor" | "24bit")
}

pub trait ColorTheme {
    fn color(&self) -> Color;
}

impl ColorTheme for log::Level {
    fn color(&self) -> Color {
        use log::Level::*;
        match self {
            Error => Color::BrightRed,
            Warn => Color::BrightYellow,
            Info => Color::Cyan,
            Debug => Color::Magenta,
            Trace => Color::Blue,
        }
    }
}

impl ColorTheme for JudgeCode {
    fn color(&self) -> Color {
        use JudgeCode::*;
        if !self::is_truecolor_supported() {
            return match self {
                AC | AA => Color::Green,
                WA => Color::Yellow,
                TLE => Color::Red,
                RE => Color::Magenta,
                CE => Color::Blue,
            };
        }

        let (r, g, b) = match self {
            AC => (30, 180, 40),
            AA => (20, 150, 120),
            WA => (210, 138, 4),
            TLE => (220, 42, 42),
            RE => (171, 40, 200),
            CE => (50, 100, 220),
        };
        Color::TrueColor { r, g, b }
    }
}

pub fn judge_icon(judge: JudgeCode) -> ColoredString {
    let fg = if is_truecolor_supported() {
        Color::TrueColor {
            r: 255,
            g: 255,
            b: 255,
        }
    } else {
        Color::BrightBlack
    };
    format!(" {} ", judge)
        .on_color(judge.color())
        .bold()
        .color(fg)
}

pub fn format_execution_time(res: &TestOutcome) -> String {
    match res.judge {
        JudgeCode::TLE => "--".to_owned(),
        _ => format!("{}ms", res.execution_time.as_millis()),
    }
}

pub fn print_run_header(cfg: &RunConfig, num_tests: usize) {
    println!(
        "Time limit: {} ms.",
        cfg.time_limit.as_millis().to_string().bold()
    );
    if let Some(checker) = &cfg.checker {
        println!("Checker: {}", checker.invocation);
    }
    println!("Running {} test(s)...\n", num_tests);
}

pub fn print_test_result_summary(summary: &TestSummary) {
    let bar = "-".repeat(5);
    print!("{} ", bar);

    let num_total_test = summary.len();
    let num_passed = summary.num_passed();
    let num_failed = num_total_test - num_passed;

    if summary.all_passed() {
        let msg = format!("All {} tests passed ✨", num_total_test);
        print!("{}", msg.green());
    } else {
        let summary_msg = if num_passed > 0 {
            format!("{}/{} tests failed 💣", num_failed, num_total_test)
        } else {
            format!("All {} tests failed 💀", num_total_test)
        };

        let detail_msg = summary
            .count_by_judge()
            .iter()
            .filter(|(&judge, _)| !judge.is_passed())
            .map(|(&judge, &cnt)| {
                format!(
                    "{}{}{}",
                    self::judge_icon(judge),
                    "x".dimmed(),
                    cnt.to_string().bold().bright_white(),
                )
            })
            .collect::<Vec<String>>()
            .join(", ");

        print!("{} ({})", summary_msg.bright_red(), detail_msg);
    }

    println!(" {}", bar);
}

/// Prints the outputs of one testcase. With `max_lines`, each block shows at
/// most that many lines.
pub fn print_test_result_detail(res: &TestOutcome, max_lines: Option<usize>) {
    let (cols, _) = terminal::size().unwrap_or((40, 40));
    let cols = cols.max(20) as usize;

    const BOLD_LINE: &str = "━";
    const THIN_LINE: &str = "─";

    let bold_bar = BOLD_LINE.repeat(cols).blue().bold();

    let title_color = Color::BrightYellow;
    let comment = if res.comment.is_empty() {
        String::new()
    } else {
        format!(" ({})", res.comment)
    };
    println!(
        "\n{}{}: {} {} [{}]\n{}",
        res.testcase_name.color(title_color).bold(),
        comment.dimmed(),
        self::judge_icon(res.judge),
        res.judge.description(),
        self::format_execution_time(res),
        bold_bar,
    );

    fn print_sub_title(s: &str, cols: usize) {
        println!(
            "{}{}",
            s.cyan().bold(),
            THIN_LINE
                .repeat(cols.saturating_sub(s.len() + 1))
                .bright_black(),
        )
    }

    fn print_lines(lines: &[String], max_lines: Option<usize>) {
        if lines.is_empty() {
            println!("{}", "<EMPTY>".magenta().dimmed());
            return;
        }
        let shown = max_lines.unwrap_or(lines.len()).min(lines.len());
        for line in &lines[..shown] {
            println!("{}", line);
        }
        if shown < lines.len() {
            println!(
                "{}",
                format!("... ({} more lines)", lines.len() - shown)
                    .bright_black()
                    .italic()
            );
        }
    }

    if let Some(message) = &res.message {
        print_sub_title("[message]", cols);
        println!("{}", message.bright_red());
    }

    if matches!(res.judge, JudgeCode::WA | JudgeCode::CE) {
        print_sub_title("[expected]", cols);
        print_lines(&res.groundtruth, max_lines);
    }

    print_sub_title("[stdout]", cols);
    print_lines(&res.stdout, max_lines);

    println!("{}", bold_bar);
}
