//! Appointment Discord commands - slot listing, booking, and release.
//!
//! These commands are thin wrappers over the scheduler core; the embargo
//! parameter stays `None` here because slash commands are not tied to a
//! ticket channel, while ticket-driven callers pass the ticket's creation
//! time through the same core function.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{Context, handlers::autocomplete},
        core::scheduler::{self, BookingOutcome},
        errors::Result,
    };
    use poise::serenity_prelude as serenity;
    use std::fmt::Write;

    /// Shows the bookable delivery-call slots for the next seven days.
    ///
    /// Days without any free slot are left out entirely; a fully booked
    /// week renders as a single "no slots" notice instead of an empty list.
    #[poise::command(slash_command)]
    pub async fn slots(ctx: Context<'_>) -> Result<()> {
        let store = &ctx.data().store;
        let now = chrono::Local::now().naive_local();

        let available = scheduler::list_available_slots(store, now, None).await?;

        if available.is_empty() {
            ctx.say("📅 No slots are available in the next 7 days. Please check back later!")
                .await?;
            return Ok(());
        }

        let total: usize = available.values().map(Vec::len).sum();
        let mut embed_fields = Vec::new();
        for (date, times) in &available {
            let day_name = date.format("%A, %Y-%m-%d").to_string();
            let slot_list = times
                .iter()
                .map(|t| t.format("%H:%M").to_string())
                .collect::<Vec<_>>()
                .join(" • ");
            embed_fields.push((day_name, slot_list, false));
        }

        let embed = serenity::CreateEmbed::default()
            .title("📅 Available Delivery-Call Slots")
            .description("Book with `/book <slot> <ticket>`. Times are local, 30-minute calls.")
            .color(0x0034_98DB)
            .fields(embed_fields)
            .footer(serenity::CreateEmbedFooter::new(format!(
                "{total} slot{} free over the next 7 days",
                if total == 1 { "" } else { "s" }
            )));

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Books a delivery-call slot for your order ticket.
    ///
    /// Booking is first come, first served: if someone grabs the slot
    /// between you seeing it and confirming, you get a conflict notice and
    /// nothing is changed.
    #[poise::command(slash_command)]
    pub async fn book(
        ctx: Context<'_>,
        #[description = "Slot to book, e.g. 2024-03-08_18:30"]
        #[autocomplete = "autocomplete::autocomplete_slot_key"]
        slot: String,
        #[description = "Your order ticket name"] ticket: String,
    ) -> Result<()> {
        let store = &ctx.data().store;
        let author = ctx.author();

        let outcome = scheduler::book_slot(
            store,
            &slot,
            &author.id.to_string(),
            author.display_name(),
            &ticket,
        )
        .await?;

        match outcome {
            BookingOutcome::Booked(appointment) => {
                ctx.say(format!(
                    "✅ Booked **{slot}** for ticket **{}**. See you there, {}!",
                    appointment.ticket_name, appointment.user_name
                ))
                .await?;
            }
            BookingOutcome::SlotTaken => {
                ctx.say(format!(
                    "❌ **{slot}** was just taken by someone else. Run `/slots` for the current list."
                ))
                .await?;
            }
        }
        Ok(())
    }

    /// Lists every booked appointment (admin overview).
    #[poise::command(slash_command, required_permissions = "ADMINISTRATOR")]
    pub async fn appointments(ctx: Context<'_>) -> Result<()> {
        let store = &ctx.data().store;

        let booked = store.load_appointments().await?;
        if booked.is_empty() {
            ctx.say("📋 No appointments are currently booked.").await?;
            return Ok(());
        }

        let mut response = String::from("📋 **Booked Appointments**\n\n");
        for (slot_key, appointment) in &booked {
            writeln!(
                &mut response,
                "• **{slot_key}** - {} (ticket `{}`)",
                appointment.user_name, appointment.ticket_name
            )?;
        }
        ctx.say(response).await?;
        Ok(())
    }

    /// Releases every appointment booked under a ticket.
    ///
    /// Run this when an order is cancelled, closed, or finishes review so
    /// its slots open up again.
    #[poise::command(slash_command, required_permissions = "ADMINISTRATOR")]
    pub async fn cancel_appointments(
        ctx: Context<'_>,
        #[description = "Ticket whose appointments should be released"] ticket: String,
    ) -> Result<()> {
        let store = &ctx.data().store;

        let removed = scheduler::free_appointments_for_ticket(store, &ticket).await?;
        if removed == 0 {
            ctx.say(format!("ℹ️ No appointments found for ticket **{ticket}**."))
                .await?;
        } else {
            ctx.say(format!(
                "✅ Released {removed} appointment{} for ticket **{ticket}**.",
                if removed == 1 { "" } else { "s" }
            ))
            .await?;
        }
        Ok(())
    }

    /// Wipes the entire appointment book.
    #[poise::command(slash_command, required_permissions = "ADMINISTRATOR")]
    pub async fn clear_appointments(ctx: Context<'_>) -> Result<()> {
        let store = &ctx.data().store;

        let removed = scheduler::clear_all_appointments(store).await?;
        ctx.say(format!(
            "🗑️ Cleared {removed} appointment{}.",
            if removed == 1 { "" } else { "s" }
        ))
        .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
