use blog_portal::models::{CommentForm, LoginForm, PostForm, RegisterForm};

// Every form field is required; the registration form additionally demands
// a matching confirmation. These mirror the server-side rules the handlers
// apply before touching the store.

fn valid_register_form() -> RegisterForm {
    RegisterForm {
        username: "alice".to_string(),
        email: "alice@example.com".to_string(),
        password: "pw123".to_string(),
        confirm_password: "pw123".to_string(),
    }
}

#[test]
fn register_form_accepts_complete_input() {
    assert!(valid_register_form().validate().is_ok());
}

#[test]
fn register_form_rejects_missing_username() {
    let form = RegisterForm {
        username: "   ".to_string(),
        ..valid_register_form()
    };
    assert_eq!(form.validate(), Err("Username is required."));
}

#[test]
fn register_form_rejects_missing_email() {
    let form = RegisterForm {
        email: String::new(),
        ..valid_register_form()
    };
    assert_eq!(form.validate(), Err("Email is required."));
}

#[test]
fn register_form_rejects_missing_password() {
    let form = RegisterForm {
        password: String::new(),
        ..valid_register_form()
    };
    assert_eq!(form.validate(), Err("Password is required."));
}

#[test]
fn register_form_rejects_missing_confirmation() {
    let form = RegisterForm {
        confirm_password: String::new(),
        ..valid_register_form()
    };
    assert_eq!(form.validate(), Err("Password confirmation is required."));
}

#[test]
fn register_form_rejects_mismatched_confirmation() {
    let form = RegisterForm {
        confirm_password: "pw124".to_string(),
        ..valid_register_form()
    };
    assert_eq!(form.validate(), Err("Passwords must match."));
}

#[test]
fn login_form_requires_both_fields() {
    let missing_email = LoginForm {
        email: String::new(),
        password: "pw123".to_string(),
    };
    assert_eq!(missing_email.validate(), Err("Email is required."));

    let missing_password = LoginForm {
        email: "alice@example.com".to_string(),
        password: String::new(),
    };
    assert_eq!(missing_password.validate(), Err("Password is required."));
}

#[test]
fn post_form_requires_every_field() {
    let complete = PostForm {
        title: "Hello".to_string(),
        subtitle: "First".to_string(),
        body: "<p>Hi</p>".to_string(),
        img_url: "https://example.com/img.png".to_string(),
    };
    assert!(complete.validate().is_ok());

    let missing_title = PostForm {
        title: String::new(),
        ..complete.clone()
    };
    assert_eq!(missing_title.validate(), Err("Title is required."));

    let missing_subtitle = PostForm {
        subtitle: String::new(),
        ..complete.clone()
    };
    assert_eq!(missing_subtitle.validate(), Err("Subtitle is required."));

    let missing_body = PostForm {
        body: String::new(),
        ..complete.clone()
    };
    assert_eq!(missing_body.validate(), Err("Post body is required."));

    let missing_img = PostForm {
        img_url: "  ".to_string(),
        ..complete
    };
    assert_eq!(missing_img.validate(), Err("Image URL is required."));
}

#[test]
fn comment_form_requires_text() {
    let empty = CommentForm { body: " ".to_string() };
    assert_eq!(empty.validate(), Err("Comment text is required."));

    let filled = CommentForm {
        body: "Nice!".to_string(),
    };
    assert!(filled.validate().is_ok());
}
