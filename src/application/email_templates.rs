const BRAND_NAME: &str = "Roamio";

/// One-time code email. The code renders large and copyable; the TTL is spelled
/// out so the recipient knows when to ask for a fresh one.
pub fn otp_email(code: &str, ttl_minutes: i64) -> (String, String) {
    let subject = format!("{code} is your {BRAND_NAME} verification code");
    let headline = "Your verification code";
    let lead = format!(
        "Enter this code to verify your email address. It expires in {ttl_minutes} minutes."
    );
    let body = format!(
        r#"<div style="margin:16px 0;padding:16px;background:#f3f4f6;border-radius:8px;text-align:center;font-size:32px;letter-spacing:0.3em;font-weight:700;color:#111827;">{code}</div>"#
    );
    let html = wrap_email(headline, &lead, &body);
    (subject, html)
}

pub fn wrap_email(headline: &str, lead: &str, body_html: &str) -> String {
    let ignore_line = "If you didn't request this, you can safely ignore this email.";

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
  <body style="background:#f8fafc;margin:0;padding:24px;font-family:Arial,Helvetica,sans-serif;">
    <div style="max-width:560px;margin:0 auto;background:#ffffff;border:1px solid #e5e7eb;border-radius:12px;padding:24px;">
      <div style="font-size:12px;letter-spacing:0.08em;text-transform:uppercase;color:#6b7280;">{BRAND_NAME}</div>
      <h1 style="margin:12px 0 8px;font-size:22px;color:#111827;">{headline}</h1>
      <p style="margin:0 0 12px;font-size:15px;color:#111827;line-height:1.6;">{lead}</p>
      {body_html}
      <div style="margin-top:20px;padding-top:16px;border-top:1px solid #e5e7eb;">
        <p style="margin:0;font-size:13px;color:#4b5563;">{ignore_line}</p>
      </div>
    </div>
  </body>
</html>"#
    )
}
