//! Per-tenant legal text.
//!
//! Every tenant page carries a Privacy Policy (with the SMS disclaimer that
//! messaging carriers require) and Terms of Service filled in with the
//! tenant's name and contact details. Output is plain text: numbered sections
//! separated by blank lines, list items prefixed with `- `.

use chrono::NaiveDate;

use crate::store::Site;

/// The carrier-compliance paragraph about SMS opt-in.
pub fn sms_disclaimer(site: &Site) -> String {
    let name = &site.business_name;
    let email = &site.email;
    format!(
        "SMS messages are sent by {name}. We provide Customer Support messages \
         (information on your order/service and help if you ever need guidance during \
         the process), and marketing of our services when applicable. When you consent \
         to receive messaging from {name}, you are providing it only to {name}, not any \
         third parties. Your SMS opt-in data will never be shared/sold to third parties. \
         By opting into messaging from {name} regarding customer support and marketing \
         messages, you understand that our message frequency may vary, you may reach out \
         to {email} with any questions, message and data rates may apply, and can reply \
         \"STOP\" to opt out from messaging from {name}."
    )
}

/// The Privacy Policy, dated `effective` (formatted `M/D/YYYY`).
pub fn privacy_policy(site: &Site, effective: NaiveDate) -> String {
    let name = &site.business_name;
    let email = &site.email;
    let phone = &site.phone;

    let mut doc = Document::new("Privacy Policy");
    doc.line(&format!("Effective Date: {}", effective.format("%-m/%-d/%Y")));
    doc.section("SMS Disclaimer", &[&sms_disclaimer(site)]);
    doc.section(
        "1. Introduction",
        &[&format!(
            "{name} (\"we,\" \"our,\" or \"us\") is committed to protecting your privacy. This \
             Privacy Policy explains how we collect, use, disclose, and safeguard your information \
             when you visit our website and use our services. Please read this Privacy Policy carefully."
        )],
    );
    doc.section(
        "2. Information We Collect",
        &[
            "Personal Data: We collect personally identifiable information, such as your name, email \
             address, phone number, and payment details, when you register on our site, place an \
             order, or subscribe to our newsletter.",
            "Usage Data: We automatically collect information about your visit to our website, \
             including your IP address, browser type, access times, and pages viewed.",
            "Cookies and Tracking Technologies: We use cookies, web beacons, and similar tracking \
             technologies to track the activity on our website and hold certain information.",
        ],
    );
    doc.section("3. Use of Your Information", &["We use the information we collect for various purposes, including:"]);
    doc.list(&[
        "Providing, operating, and maintaining our website and services.",
        "Improving, personalizing, and expanding our website and services.",
        "Processing transactions and managing your orders.",
        "Communicating with you, including responding to inquiries, providing customer support, and sending updates.",
    ]);
    doc.section(
        "4. Disclosure of Your Information",
        &[
            "We may share your information with:",
            "Service Providers: Third-party vendors who provide services on our behalf, such as payment \
             processing, data analysis, email delivery, and hosting services.",
            "Affiliates: We may share your information with our affiliates, in which case we will \
             require them to honor this Privacy Policy.",
            "Business Transfers: If we undergo a merger, acquisition, or asset sale, your information \
             may be transferred.",
            "No data is shared/sold to third parties for marketing and promotional purposes, including \
             SMS opt-in consent. SMS opt-in consent is not shared/sold to third parties for \
             marketing/promotional purposes.",
        ],
    );
    doc.section(
        "5. Data Security",
        &["We implement a variety of security measures to maintain the safety of your personal \
           information. However, no method of transmission over the Internet or electronic storage \
           is 100% secure."],
    );
    doc.section(
        "6. Your Data Protection Rights",
        &["Depending on your location, you may have the following rights regarding your personal data:"],
    );
    doc.list(&[
        "The right to access - You have the right to request copies of your personal data.",
        "The right to rectification - You have the right to request correction of any inaccurate information.",
        "The right to erasure - You have the right to request that we erase your personal data, under certain conditions.",
        "The right to restrict processing - You have the right to request that we restrict the processing of your personal data, under certain conditions.",
        "The right to object to processing - You have the right to object to our processing of your personal data, under certain conditions.",
        "The right to data portability - You have the right to request that we transfer your data to another organization, or directly to you, under certain conditions.",
    ]);
    doc.section(
        "7. California Consumer Privacy Act (CCPA)",
        &["If you are a California resident, you have specific rights under the California Consumer \
           Privacy Act (CCPA). These include the right to:"],
    );
    doc.list(&[
        "Know what personal data is being collected about you.",
        "Know whether your personal data is sold or disclosed and to whom.",
        "Access your personal data.",
        "Request deletion of your personal data.",
        "Opt-out of the sale of your personal data.",
        "Non-discrimination for exercising your privacy rights.",
    ]);
    doc.paragraph(&format!(
        "To exercise your CCPA rights, please contact us at {email}. We will respond to your request \
         within the timeframe required by law."
    ));
    doc.section(
        "8. Changes to This Privacy Policy",
        &["We may update our Privacy Policy from time to time. We will notify you of any changes by \
           posting the new Privacy Policy on this page. Changes are effective when they are posted on \
           this page."],
    );
    doc.section(
        "9. Contact Us",
        &["If you have any questions about this Privacy Policy, please contact us at:"],
    );
    doc.line(&format!("Email: {email}"));
    doc.line(&format!("Phone: {phone}"));
    doc.paragraph("By using our website and services, you consent to the terms of this Privacy Policy.");
    doc.finish()
}

/// The Terms of Service.
pub fn terms_of_service(site: &Site) -> String {
    let name = &site.business_name;
    let email = &site.email;
    let phone = &site.phone;

    let mut doc = Document::new("Terms of Service");
    doc.section(
        "1. Introduction",
        &[&format!(
            "These Terms of Service (\"Terms\") govern your use of the services provided by {name} \
             (\"we,\" \"our,\" or \"us\"). By accessing or using our services, you agree to be bound \
             by these Terms."
        )],
    );
    doc.section(
        "2. Services",
        &["We provide services (\"Services\"). We reserve the right to modify or discontinue the \
           Services at any time without notice."],
    );
    doc.section(
        "3. Account Registration",
        &["To use our Services, you may need to create an account. You are responsible for \
           maintaining the confidentiality of your account credentials and for all activities that \
           occur under your account."],
    );
    doc.section(
        "4. Acceptable Use",
        &["You agree to use our Services in compliance with all applicable laws and regulations. You must not:"],
    );
    doc.list(&[
        "Use the Services for any unlawful purpose.",
        "Attempt to gain unauthorized access to the Services or related systems.",
        "Interfere with or disrupt the integrity or performance of the Services.",
    ]);
    doc.section(
        "5. Fees and Payment",
        &["You agree to pay all applicable fees for the Services as outlined in your service \
           agreement. Fees are non-refundable except as required by law."],
    );
    doc.section(
        "6. Intellectual Property",
        &["We own all rights, title, and interest in and to the Services, including all intellectual \
           property rights. You are granted a limited, non-exclusive, non-transferable, and revocable \
           license to use the Services for your internal business purposes."],
    );
    doc.section(
        "7. Confidentiality",
        &["You agree to maintain the confidentiality of any non-public information disclosed to you \
           by us, including business, technical, and financial information."],
    );
    doc.section(
        "8. Privacy",
        &["Your use of the Services is also governed by our Privacy Policy, which is incorporated by \
           reference into these Terms."],
    );
    doc.section(
        "9. Limitation of Liability",
        &[&format!(
            "To the maximum extent permitted by law, {name} will not be liable for any indirect, \
             incidental, special, consequential, or punitive damages, or any loss of profits or \
             revenues, whether incurred directly or indirectly, or any loss of data, use, goodwill, or \
             other intangible losses, resulting from:"
        )],
    );
    doc.list(&[
        "Your use or inability to use the Services.",
        "Any unauthorized access to or use of our servers and/or any personal information stored therein.",
        "Any interruption or cessation of transmission to or from the Services.",
    ]);
    doc.section(
        "10. Indemnification",
        &[&format!(
            "You agree to indemnify, defend, and hold harmless {name}, its affiliates, officers, \
             directors, employees, and agents from and against any and all claims, liabilities, \
             damages, losses, and expenses, including reasonable attorney's fees, arising out of or in \
             any way connected with your access to or use of the Services or your violation of these Terms."
        )],
    );
    doc.section(
        "11. Termination",
        &["We may terminate or suspend your account and access to the Services at our sole \
           discretion, without prior notice or liability, for any reason whatsoever, including without \
           limitation if you breach the Terms. Upon termination, your right to use the Services will \
           immediately cease."],
    );
    doc.section(
        "12. Governing Law",
        &["These Terms shall be governed and construed in accordance with applicable laws, without \
           regard to conflict of law provisions."],
    );
    doc.section(
        "13. Links to Other Websites",
        &[&format!(
            "Our Service may contain links to third-party web sites or services that are not owned or \
             controlled by {name}."
        )],
    );
    doc.section(
        "14. Dispute Resolution",
        &["Any disputes arising out of or in connection with these Terms or the Services shall be \
           resolved through binding arbitration in accordance with applicable arbitration rules."],
    );
    doc.section(
        "15. Changes to the Terms",
        &["We reserve the right, at our sole discretion, to modify or replace these Terms at any time. \
           If a revision is material, we will provide at least 30 days' notice prior to any new terms \
           taking effect. What constitutes a material change will be determined at our sole discretion."],
    );
    doc.section("16. Contact Us", &["If you have any questions about these Terms, please contact us at:"]);
    doc.line(&format!("Email: {email}"));
    doc.line(&format!("Phone: {phone}"));
    doc.finish()
}

/// Accumulates a plain-text document.
struct Document {
    out: String,
}

impl Document {
    fn new(title: &str) -> Self {
        Self { out: format!("{title}\n") }
    }

    fn section(&mut self, heading: &str, paragraphs: &[&str]) {
        self.out.push('\n');
        self.out.push_str(heading);
        self.out.push('\n');
        for p in paragraphs {
            self.out.push_str(p);
            self.out.push('\n');
        }
    }

    fn paragraph(&mut self, text: &str) {
        self.out.push('\n');
        self.line(text);
    }

    fn line(&mut self, text: &str) {
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn list(&mut self, items: &[&str]) {
        for item in items {
            self.out.push_str("- ");
            self.line(item);
        }
    }

    fn finish(self) -> String {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> Site {
        Site {
            slug: "acme".into(),
            business_name: "Acme Plumbing".into(),
            email: "hello@acme.test".into(),
            phone: "+1 555 0100".into(),
            description: Some("Pipes".into()),
            created_at: None,
        }
    }

    #[test]
    fn disclaimer_names_the_sender_and_contact() {
        let text = sms_disclaimer(&site());
        assert!(text.starts_with("SMS messages are sent by Acme Plumbing."));
        assert!(text.contains("reach out to hello@acme.test"));
        assert!(text.contains("reply \"STOP\""));
    }

    #[test]
    fn privacy_policy_is_filled_in() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        let text = privacy_policy(&site(), date);

        assert!(text.starts_with("Privacy Policy\nEffective Date: 3/7/2026\n"));
        assert!(text.contains("\nSMS Disclaimer\nSMS messages are sent by Acme Plumbing."));
        assert!(text.contains("\n9. Contact Us\n"));
        assert!(text.contains("Email: hello@acme.test\nPhone: +1 555 0100\n"));
        assert!(text.contains("- Request deletion of your personal data.\n"));
    }

    #[test]
    fn terms_have_sixteen_sections() {
        let text = terms_of_service(&site());
        assert!(text.starts_with("Terms of Service\n"));
        assert!(text.contains("hold harmless Acme Plumbing, its affiliates"));
        for n in 1..=16 {
            assert!(text.contains(&format!("\n{n}. ")), "missing section {n}");
        }
        assert!(text.ends_with("Phone: +1 555 0100\n"));
    }
}
