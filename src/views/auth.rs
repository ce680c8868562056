use crate::views::{PageContext, Rendered, input, render};

/// Login form.
pub fn login(ctx: &PageContext) -> Rendered {
    render(ctx, |out| {
        out.push_str("<form method=\"post\" action=\"/login\">\n");
        input(out, "Username", "text", "username", "", true)?;
        input(out, "Password", "password", "password", "", true)?;
        out.push_str("<button type=\"submit\">Login</button>\n</form>\n");
        Ok(())
    })
}

/// Password change form for the logged-in user.
pub fn update_password(ctx: &PageContext) -> Rendered {
    render(ctx, |out| {
        out.push_str("<form method=\"post\" action=\"/update_password\">\n");
        input(out, "Current password", "password", "password", "", true)?;
        input(out, "New password", "password", "new_password", "", true)?;
        out.push_str("<button type=\"submit\">Update Password</button>\n</form>\n");
        Ok(())
    })
}
