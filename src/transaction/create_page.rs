//! Defines the route handler for the stock-out form.

use axum::{
    Extension,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

use crate::{
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CHECKBOX_GROUP_STYLE, FORM_CHECKBOX_INPUT_STYLE,
        FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base, loading_spinner,
    },
    navigation::NavBar,
    role::Role,
    transaction::core::METER_TYPE_OPTIONS,
};

fn stock_out_view(role: Role) -> Markup {
    let create_transaction_route = endpoints::TRANSACTIONS_API;
    let nav_bar = NavBar::new(endpoints::STOCK_OUT_VIEW, role).into_html();
    let spinner = loading_spinner();

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            form
                hx-post=(create_transaction_route)
                hx-encoding="multipart/form-data"
                hx-target-error="#alert-container"
                class="w-full space-y-4 md:space-y-6"
            {
                h2 class="text-xl font-bold" { "Stock Out" }

                p class="text-sm text-gray-500 dark:text-gray-400"
                {
                    "Complete this form when taking stock out for installation. \
                    Upload photos showing the serial numbers."
                }

                fieldset
                {
                    legend class=(FORM_LABEL_STYLE) { "Meter Type" }

                    div class=(FORM_CHECKBOX_GROUP_STYLE)
                    {
                        @for (index, meter_type) in METER_TYPE_OPTIONS.iter().enumerate() {
                            @let id = format!("meter_type_{index}");

                            label for=(id) class="flex items-center gap-2 text-sm"
                            {
                                input
                                    id=(id)
                                    name="meter_type"
                                    type="checkbox"
                                    value=(meter_type)
                                    class=(FORM_CHECKBOX_INPUT_STYLE);

                                (meter_type)
                            }
                        }
                    }
                }

                div class="grid grid-cols-2 gap-4"
                {
                    div
                    {
                        label for="meter_quantity" class=(FORM_LABEL_STYLE) { "Meter Quantity" }

                        input
                            name="meter_quantity"
                            id="meter_quantity"
                            type="number"
                            min="0"
                            step="1"
                            value="0"
                            required
                            class=(FORM_TEXT_INPUT_STYLE);
                    }

                    div
                    {
                        label for="ciu_quantity" class=(FORM_LABEL_STYLE) { "CIU Quantity" }

                        input
                            name="ciu_quantity"
                            id="ciu_quantity"
                            type="number"
                            min="0"
                            step="1"
                            value="0"
                            required
                            class=(FORM_TEXT_INPUT_STYLE);
                    }
                }

                div
                {
                    label for="stock_issued_to" class=(FORM_LABEL_STYLE)
                    {
                        "Stock Issued To"
                    }

                    input
                        name="stock_issued_to"
                        id="stock_issued_to"
                        type="text"
                        placeholder="Installer name / team"
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="notes" class=(FORM_LABEL_STYLE) { "Notes (optional)" }

                    textarea
                        name="notes"
                        id="notes"
                        rows="3"
                        class=(FORM_TEXT_INPUT_STYLE)
                    {}
                }

                div
                {
                    label for="photos" class=(FORM_LABEL_STYLE)
                    {
                        "Photo(s) of each meter showing serial numbers (jpg/png)"
                    }

                    input
                        name="photos"
                        id="photos"
                        type="file"
                        accept=".jpg,.jpeg,.png,image/jpeg,image/png"
                        multiple
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
                {
                    span
                        id="indicator"
                        class="inline htmx-indicator"
                    {
                        (spinner)
                    }
                    " Submit Stock Out"
                }
            }
        }
    };

    base("Stock Out", &content)
}

/// Renders the stock-out form.
pub async fn get_stock_out_page(Extension(role): Extension<Role>) -> Response {
    stock_out_view(role).into_response()
}
