use adw::prelude::*;
use adw::Application;
use gtk4 as gtk;

pub fn show_settings_window(app: &Application) {
    let window = adw::ApplicationWindow::builder()
        .application(app)
        .title("Fax Endpoint")
        .default_width(420)
        .default_height(220)
        .resizable(false)
        .build();

    let toast_overlay = adw::ToastOverlay::new();

    // Root container
    let root = gtk::Box::new(gtk::Orientation::Vertical, 12);
    root.set_margin_top(24);
    root.set_margin_bottom(24);
    root.set_margin_start(24);
    root.set_margin_end(24);

    // Title
    let title = gtk::Label::new(Some("Where should faxes be sent?"));
    title.add_css_class("title-2");
    title.set_halign(gtk::Align::Start);
    root.append(&title);

    // Endpoint URL
    let endpoint_entry = gtk::Entry::new();
    endpoint_entry.set_placeholder_text(Some("Endpoint URL (e.g. http://localhost:8000/send-fax/)"));
    endpoint_entry.set_hexpand(true);
    endpoint_entry.set_text(&crate::app::AppState::load().endpoint);
    root.append(&endpoint_entry);

    // Status label (small, muted)
    let status = gtk::Label::new(None);
    status.add_css_class("dim-label");
    status.set_halign(gtk::Align::Start);
    root.append(&status);

    // Save button
    let save_btn = gtk::Button::with_label("Save");
    save_btn.add_css_class("suggested-action");
    save_btn.set_halign(gtk::Align::End);
    root.append(&save_btn);

    toast_overlay.set_child(Some(&root));
    // Add a header bar inside content to show window decorations
    let container = gtk::Box::new(gtk::Orientation::Vertical, 0);
    let header = adw::HeaderBar::new();
    let header_title = gtk::Label::new(Some("Fax"));
    header.set_title_widget(Some(&header_title));
    container.append(&header);
    container.append(&toast_overlay);
    window.set_content(Some(&container));

    // Trigger save action
    let on_save = {
        let app = app.clone();
        let window = window.clone();
        let overlay = toast_overlay.clone();
        let endpoint_entry = endpoint_entry.clone();
        move || {
            let overlay = overlay.clone();
            let endpoint = crate::utils::normalize_endpoint(&endpoint_entry.text());
            if endpoint.is_empty() {
                overlay.add_toast(adw::Toast::new("Please enter the fax endpoint URL."));
                return;
            }
            if url::Url::parse(&endpoint).is_err() {
                overlay.add_toast(adw::Toast::new("That does not look like a valid URL."));
                return;
            }

            status.set_label("Checking…");

            // The probe is informational only; the endpoint is saved either way.
            let endpoint_for_async = endpoint.clone();
            let rx: glib::Receiver<Result<(String, String), String>> =
                crate::utils::run_async_to_main(async move {
                    let client = crate::api::client::ApiClient {
                        http: reqwest::Client::builder()
                            .timeout(std::time::Duration::from_secs(5))
                            .build()
                            .map_err(|e| e.to_string())?,
                    };
                    match client.probe(&endpoint_for_async).await {
                        Ok(code) => Ok((endpoint_for_async, format!("Reachable (HTTP {})", code))),
                        Err(_) => Ok((endpoint_for_async, "Saved (endpoint unreachable)".to_string())),
                    }
                });

            let status_label = status.clone();
            let app2 = app.clone();
            let window2 = window.clone();
            let overlay2 = overlay.clone();
            rx.attach(None, move |res| {
                match res {
                    Ok((endpoint, message)) => {
                        log::info!("endpoint check: {endpoint} - {message}");
                        status_label.set_label(&message);
                        let mut st = crate::app::AppState::load();
                        st.endpoint = endpoint;
                        if let Err(e) = st.save() {
                            overlay2.add_toast(adw::Toast::new(&format!("Failed to save settings: {}", e)));
                        }
                        crate::ui::fax_form::show_fax_form_window(&app2);
                        window2.close();
                    }
                    Err(err) => {
                        log::error!("endpoint check failed: {err}");
                        status_label.set_label("Check failed");
                        overlay2.add_toast(adw::Toast::new("Could not validate the endpoint URL."));
                    }
                }
                glib::ControlFlow::Continue
            });
        }
    };

    use std::rc::Rc;
    let on_save: Rc<dyn Fn()> = Rc::new(on_save);
    // Button click
    {
        let on_save = on_save.clone();
        save_btn.connect_clicked(move |_| (on_save)());
    }
    // Enter key in the entry triggers save
    {
        let on_save = on_save.clone();
        endpoint_entry.connect_activate(move |_| (on_save)());
    }

    window.present();
}
