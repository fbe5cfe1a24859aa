use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::time::Duration;

/// Total / successes / failures bars for a batch over tickers; hidden unless `tui` is set.
pub(crate) struct BatchProgress {
    _multi: Option<MultiProgress>,
    total: ProgressBar,
    success: ProgressBar,
    fails: ProgressBar,
}

impl BatchProgress {
    pub(crate) fn new(len: usize, name: &str, tui: bool) -> Self {
        if !tui {
            return Self {
                _multi: None,
                total: ProgressBar::hidden(),
                success: ProgressBar::hidden(),
                fails: ProgressBar::hidden(),
            };
        }

        println!("{bar}\n{name:^40}\n{bar}", bar = "=".repeat(40));
        let multi = MultiProgress::new();

        // total number of tickers to collect
        let total = multi.add(
            ProgressBar::new(len as u64).with_style(
                ProgressStyle::default_bar()
                    .template(
                        "{spinner:.magenta}\n \
                        {msg:>9.white} |{bar:57.white/grey}| {pos:<2} / {human_len} \
                        ({percent_precise}%) [Time: {elapsed}, Rate: {per_sec}, ETA: {eta}]",
                    )
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("## "),
            ),
        );
        total.set_message("total");
        total.enable_steady_tick(Duration::from_millis(100));

        let success = multi.insert_after(
            &total,
            bar(len, " {msg:>9.green} |{bar:57.green}| {pos:<2.green}"),
        );
        success.set_message("successes");

        let fails = multi.insert_after(
            &success,
            bar(len, " {msg:>9.red} |{bar:57.red}| {pos:<2.red}"),
        );
        fails.set_message("failures");

        Self {
            _multi: Some(multi),
            total,
            success,
            fails,
        }
    }

    pub(crate) fn success(&self) {
        self.success.inc(1);
        self.total.inc(1);
    }

    pub(crate) fn fail(&self) {
        self.fails.inc(1);
        self.total.inc(1);
    }

    pub(crate) fn finish(&self) {
        for pb in [&self.total, &self.success, &self.fails] {
            pb.finish();
        }
    }
}

fn bar(len: usize, template: &str) -> ProgressBar {
    ProgressBar::new(len as u64).with_style(
        ProgressStyle::default_bar()
            .template(template)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("## "),
    )
}
