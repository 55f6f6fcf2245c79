//! Small server-rendered pages for the human-facing control panel. The
//! machine-facing surface is `/status`; nothing here is compatibility
//! critical.

use restwall_core::control::{ControlMode, ControlState};

fn escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn shell(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"UTF-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n\
         <title>{}</title>\n\
         <style>\n\
         body {{ font-family: sans-serif; max-width: 420px; margin: 40px auto; padding: 0 16px; color: #333; }}\n\
         h1 {{ font-size: 22px; }}\n\
         .badge {{ display: inline-block; padding: 6px 14px; border-radius: 14px; background: #eef; }}\n\
         .card {{ background: #f6f7f9; border-radius: 10px; padding: 16px; margin: 16px 0; }}\n\
         a.button {{ display: block; text-align: center; padding: 12px; margin: 8px 0;\n\
                     border-radius: 8px; color: white; text-decoration: none; }}\n\
         .lock {{ background: #e5484d; }} .unlock {{ background: #2f6fed; }} .auto {{ background: #2f9e44; }}\n\
         .muted {{ color: #888; font-size: 13px; }}\n\
         </style>\n</head>\n<body>\n{}\n</body>\n</html>\n",
        escape(title),
        body
    )
}

/// The control panel: current snapshot plus prefilled action links.
pub fn control_page(state: &ControlState, admin_key: &str) -> String {
    let key = escape(admin_key);
    let message_line = match (state.mode, state.custom_message.as_deref()) {
        (ControlMode::ForceLock, Some(message)) => {
            format!("<p>Message on the overlay: <b>{}</b></p>", escape(message))
        }
        _ => String::new(),
    };
    let body = format!(
        "<h1>Screen break control</h1>\n\
         <p><span class=\"badge\">{status}</span></p>\n\
         <div class=\"card\">Scheduled windows: every hour, minutes 0&ndash;5 and 30&ndash;35.</div>\n\
         {message_line}\
         <a class=\"button lock\" href=\"/admin?key={key}&amp;action=force_lock&amp;duration={minutes}\">Lock now ({minutes} min)</a>\n\
         <a class=\"button unlock\" href=\"/admin?key={key}&amp;action=force_unlock\">Unlock now</a>\n\
         <a class=\"button auto\" href=\"/admin?key={key}&amp;action=auto\">Back to automatic</a>\n\
         <p class=\"muted\"><a href=\"/admin?key={key}\">Refresh</a></p>",
        status = escape(&state.status_text()),
        minutes = state.force_lock_minutes,
    );
    shell("Screen break control", &body)
}

/// Confirmation page after a mutating action, linking back to the panel.
pub fn success_page(title: &str, message: &str, admin_key: &str) -> String {
    let body = format!(
        "<h1>{}</h1>\n<p>{}</p>\n\
         <p><a href=\"/admin?key={}\">Back to the panel</a></p>",
        escape(title),
        escape(message),
        escape(admin_key)
    );
    shell(title, &body)
}

pub fn error_page(title: &str, message: &str) -> String {
    let body = format!("<h1>{}</h1>\n<p>{}</p>", escape(title), escape(message));
    shell(title, &body)
}
