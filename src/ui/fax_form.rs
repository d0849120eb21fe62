use adw::prelude::*;
use adw::Application;
use gtk4 as gtk;
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use crate::api::client::{ApiClient, SendError};
use crate::api::models::{Attachment, FaxOutcome, FaxSubmission};

/// One line per attempt. Success and rejection render whatever identifying
/// detail the endpoint offered, falling back to the whole body.
fn status_line(result: &Result<FaxOutcome, SendError>) -> String {
    match result {
        Ok(FaxOutcome::Sent { fax_id: Some(id), .. }) => format!("Fax sent! ID: {}", id),
        Ok(FaxOutcome::Sent { fax_id: None, body }) => format!("Fax sent! ID: {}", body),
        Ok(FaxOutcome::Rejected { detail: Some(detail), .. }) => format!("Error: {}", detail),
        Ok(FaxOutcome::Rejected { body, .. }) => format!("Error: {}", body),
        Err(err @ SendError::Transport(_)) => format!("Request failed: {}", err),
        Err(err) => format!("Error: {}", err),
    }
}

pub fn show_fax_form_window(app: &Application) {
    let window = adw::ApplicationWindow::builder()
        .application(app)
        .title("Send a Fax")
        .default_width(480)
        .default_height(560)
        .build();

    let toast_overlay = adw::ToastOverlay::new();

    let root = gtk::Box::new(gtk::Orientation::Vertical, 12);
    root.set_margin_top(24);
    root.set_margin_bottom(24);
    root.set_margin_start(24);
    root.set_margin_end(24);

    let title = gtk::Label::new(Some("Send a Fax"));
    title.add_css_class("title-2");
    title.set_halign(gtk::Align::Start);
    root.append(&title);

    // Destination is the only field required to submit
    let to_entry = gtk::Entry::new();
    to_entry.set_placeholder_text(Some("To Number"));
    to_entry.set_hexpand(true);

    let from_entry = gtk::Entry::new();
    from_entry.set_placeholder_text(Some("From Number"));
    from_entry.set_hexpand(true);

    let cover_view = gtk::TextView::new();
    cover_view.set_wrap_mode(gtk::WrapMode::WordChar);
    let cover_scroller = gtk::ScrolledWindow::builder()
        .min_content_height(140)
        .hexpand(true)
        .build();
    cover_scroller.set_child(Some(&cover_view));

    let attach_btn = gtk::Button::with_label("Attach PDF…");

    // Arrange fields
    let form = gtk::Box::new(gtk::Orientation::Vertical, 8);
    form.append(&to_entry);
    form.append(&from_entry);
    form.append(&cover_scroller);
    form.append(&attach_btn);
    root.append(&form);

    // Status line, shown only once there is something to say
    let status = gtk::Label::new(None);
    status.add_css_class("dim-label");
    status.set_halign(gtk::Align::Start);
    status.set_wrap(true);
    status.set_visible(false);
    root.append(&status);

    let send_btn = gtk::Button::with_label("Send Fax");
    send_btn.add_css_class("suggested-action");
    send_btn.set_halign(gtk::Align::End);
    root.append(&send_btn);

    toast_overlay.set_child(Some(&root));

    let container = gtk::Box::new(gtk::Orientation::Vertical, 0);
    let header = adw::HeaderBar::new();
    let header_title = gtk::Label::new(Some("Fax"));
    header.set_title_widget(Some(&header_title));
    let endpoint_btn = gtk::Button::with_label("Endpoint");
    header.pack_end(&endpoint_btn);
    container.append(&header);
    container.append(&toast_overlay);
    window.set_content(Some(&container));
    window.present();

    // The picker filters to PDFs; the selection is kept as a path and read
    // only when a submission actually goes out.
    let selected: Rc<RefCell<Option<PathBuf>>> = Rc::new(RefCell::new(None));
    {
        let selected = selected.clone();
        let window = window.clone();
        let attach_btn_for_dialog = attach_btn.clone();
        attach_btn.connect_clicked(move |_| {
            let filter = gtk::FileFilter::new();
            filter.set_name(Some("PDF documents"));
            filter.add_mime_type("application/pdf");
            let filters = gtk::gio::ListStore::new::<gtk::FileFilter>();
            filters.append(&filter);
            let dialog = gtk::FileDialog::builder()
                .title("Choose a PDF")
                .filters(&filters)
                .default_filter(&filter)
                .build();
            let selected = selected.clone();
            let attach_btn = attach_btn_for_dialog.clone();
            dialog.open(Some(&window), None::<&gtk::gio::Cancellable>, move |res| {
                match res {
                    Ok(file) => {
                        if let Some(path) = file.path() {
                            let label = path
                                .file_name()
                                .and_then(|n| n.to_str())
                                .unwrap_or("document.pdf")
                                .to_string();
                            attach_btn.set_label(&label);
                            *selected.borrow_mut() = Some(path);
                        }
                    }
                    Err(err) => log::debug!("file dialog dismissed: {err}"),
                }
            });
        });
    }

    // Submit action: snapshot the fields, POST off the main loop, render the
    // outcome. The send button stays insensitive while a submission is in
    // flight, so a second submit cannot overlap the first.
    let on_send = {
        let overlay = toast_overlay.clone();
        let to_entry = to_entry.clone();
        let from_entry = from_entry.clone();
        let cover_view = cover_view.clone();
        let selected = selected.clone();
        let status = status.clone();
        let send_btn = send_btn.clone();
        move || {
            let to_number = to_entry.text().to_string();
            if to_number.trim().is_empty() {
                overlay.add_toast(adw::Toast::new("Please enter a destination number."));
                to_entry.grab_focus();
                return;
            }
            let state = crate::app::AppState::load();
            if state.endpoint.is_empty() {
                overlay.add_toast(adw::Toast::new("No fax endpoint configured."));
                return;
            }

            let from_number = from_entry.text().to_string();
            let buffer = cover_view.buffer();
            let cover_letter = buffer
                .text(&buffer.start_iter(), &buffer.end_iter(), false)
                .to_string();
            let attachment_path = selected.borrow().clone();

            send_btn.set_sensitive(false);
            status.set_label("Sending…");
            status.set_visible(true);

            let rx: glib::Receiver<Result<FaxOutcome, SendError>> =
                crate::utils::run_async_to_main(async move {
                    let attachment = match attachment_path {
                        Some(path) => {
                            let bytes = std::fs::read(&path).map_err(|source| {
                                SendError::Attachment {
                                    path: path.display().to_string(),
                                    source,
                                }
                            })?;
                            let filename = path
                                .file_name()
                                .and_then(|n| n.to_str())
                                .unwrap_or("document.pdf")
                                .to_string();
                            Some(Attachment { filename, bytes })
                        }
                        None => None,
                    };
                    let submission = FaxSubmission {
                        to_number,
                        from_number,
                        cover_letter,
                        attachment,
                    };
                    ApiClient::new().send_fax(&state.endpoint, submission).await
                });

            let status_label = status.clone();
            let send_btn2 = send_btn.clone();
            rx.attach(None, move |res| {
                if let Err(err) = &res {
                    log::error!("fax submission failed: {err}");
                }
                status_label.set_label(&status_line(&res));
                status_label.set_visible(true);
                send_btn2.set_sensitive(true);
                glib::ControlFlow::Continue
            });
        }
    };

    let on_send: Rc<dyn Fn()> = Rc::new(on_send);
    {
        let on_send = on_send.clone();
        send_btn.connect_clicked(move |_| (on_send)());
    }
    {
        let on_send = on_send.clone();
        to_entry.connect_activate(move |_| (on_send)());
    }
    {
        let on_send = on_send.clone();
        from_entry.connect_activate(move |_| (on_send)());
    }

    // Endpoint can be edited in place without recreating the form
    {
        let overlay = toast_overlay.clone();
        endpoint_btn.connect_clicked(move |_| {
            let dialog = gtk::Dialog::builder()
                .title("Fax Endpoint")
                .transient_for(&window)
                .modal(true)
                .build();
            let content = gtk::Box::new(gtk::Orientation::Vertical, 12);
            content.set_margin_top(12);
            content.set_margin_bottom(12);
            content.set_margin_start(12);
            content.set_margin_end(12);

            let info = gtk::Label::new(Some("Faxes are submitted to this URL:"));
            info.set_halign(gtk::Align::Start);
            content.append(&info);

            let entry = gtk::Entry::new();
            entry.set_placeholder_text(Some("Endpoint URL"));
            entry.set_hexpand(true);
            entry.set_text(&crate::app::AppState::load().endpoint);
            content.append(&entry);

            dialog.set_child(Some(&content));
            let _ = dialog.add_button("Cancel", gtk::ResponseType::Cancel);
            let ok_btn = dialog.add_button("Save", gtk::ResponseType::Ok);
            ok_btn.add_css_class("suggested-action");
            dialog.set_default_response(gtk::ResponseType::Ok);

            let overlay2 = overlay.clone();
            dialog.connect_response(move |dlg, resp| {
                if resp == gtk::ResponseType::Ok {
                    let endpoint = crate::utils::normalize_endpoint(&entry.text());
                    if endpoint.is_empty() || url::Url::parse(&endpoint).is_err() {
                        overlay2.add_toast(adw::Toast::new("That does not look like a valid URL."));
                        return;
                    }
                    let mut st = crate::app::AppState::load();
                    st.endpoint = endpoint;
                    if let Err(e) = st.save() {
                        overlay2.add_toast(adw::Toast::new(&format!("Failed to save settings: {}", e)));
                    }
                }
                dlg.close();
            });

            dialog.present();
        });
    }
}
