//! Output formatting for device API responses.

use std::io::{self, Write};

use aircon_api::ControlResponse;

/// Status line plus raw body, one per line.
pub fn render_control(resp: &ControlResponse) -> String {
    format!(
        "STATUS CODE: {}\nRAW RESPONSE: {}",
        resp.status.as_u16(),
        resp.body
    )
}

/// Print the rendered output to stdout.
pub fn print_output(output: &str) {
    if output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use aircon_api::StatusCode;

    #[test]
    fn control_output_has_status_and_body() {
        let resp = ControlResponse {
            status: StatusCode::BAD_REQUEST,
            body: r#"{"error":{"code":"2000"}}"#.into(),
        };

        assert_eq!(
            render_control(&resp),
            "STATUS CODE: 400\nRAW RESPONSE: {\"error\":{\"code\":\"2000\"}}"
        );
    }
}
