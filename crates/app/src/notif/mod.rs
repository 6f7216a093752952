use app_splitter::RunSummary;
use notify_rust::{error::Error, Notification, NotificationHandle, Timeout, Urgency};

#[derive(Debug)]
pub struct NotificationInfo {
    pub urgency: Urgency,
    pub timeout: Timeout,
    pub icon: String,
    pub title: String,
    pub message: String,
}

impl From<&RunSummary> for NotificationInfo {
    fn from(summary: &RunSummary) -> Self {
        let failed = summary.failed();

        let (urgency, icon, title) = if failed > 0 {
            (Urgency::Normal, "error", "Some videos failed to split")
        } else {
            (Urgency::Low, "success", "Finished splitting videos")
        };

        Self {
            urgency,
            timeout: Timeout::Milliseconds(if failed > 0 { 10_000 } else { 5_000 }),
            icon: icon.to_string(),
            title: title.to_string(),
            message: format!(
                "Processed: {processed}, failed: {failed}, skipped: {skipped}",
                processed = summary.processed(),
                skipped = summary.skipped(),
            ),
        }
    }
}

pub fn send_notification(info: &NotificationInfo) -> Result<NotificationHandle, Error> {
    let mut notif = Notification::new();

    if cfg!(target_os = "linux") {
        notif.urgency(info.urgency);
    }

    let notif = notif
        .appname("video segmenter")
        .timeout(info.timeout)
        .summary(&info.title)
        .body(&info.message)
        .icon(&info.icon);

    notif.show()
}
