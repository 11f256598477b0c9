use utoipa::openapi::security::{
    ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme,
};
use utoipa::Modify;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Journely API",
        version = "1.0.0",
        description = "Backend API for the Journely journaling app. Entry bodies are \
            encrypted at rest; display endpoints return decrypted content.",
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server"),
    ),
    paths(
        // Health
        crate::handlers::health::health_check,

        // Entries
        crate::handlers::entries_handler::list_entries,
        crate::handlers::entries_handler::get_entry,
        crate::handlers::entries_handler::create_entry,
        crate::handlers::entries_handler::update_entry,
        crate::handlers::entries_handler::delete_entry,
        crate::handlers::entries_handler::delete_many_entries,

        // Reflection
        crate::handlers::reflection_handler::daily_prompt,
        crate::handlers::reflection_handler::todays_reflection,
    ),
    components(
        schemas(
            // Core models
            crate::models::JournalEntry,
            crate::models::EntryKind,

            // Input and response models
            crate::models::CreateEntryInput,
            crate::models::UpdateEntryInput,
            crate::models::DeleteManyInput,
            crate::models::EntryCreated,
            crate::models::EntryMutationResponse,
            crate::store::DeleteOutcome,
            crate::handlers::reflection_handler::DailyPromptResponse,
            crate::handlers::reflection_handler::TodayReflectionResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check"),
        (name = "entries", description = "Journal and reflection entry management"),
        (name = "reflection", description = "Daily reflection prompt workflow"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "cookie_auth",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("__session"))),
            );
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
